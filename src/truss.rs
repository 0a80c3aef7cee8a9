//! Planar pin-jointed truss and its method-of-joints solver.
//!
//! The solver writes the equilibrium of every joint as one linear system: two
//! equations per joint, one unknown per member force and one per restrained
//! support component. Tension is positive. Several load cases are solved at once,
//! one right-hand-side column per case.

use std::collections::HashMap;

use nalgebra::{DMatrix, Matrix3, Vector2, Vector3};
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::errors::AnalysisError;
use crate::geometry::{Force, Point};

/// Loads applied to joints for a single load case.
pub type JointLoads = Vec<(NodeIndex, Force)>;

/// Internal representation of a truss joint.
#[derive(Clone, Debug)]
struct Joint {
    /// Position of the joint in metres.
    position: Point,
    /// Indicator for each translational degree of freedom that is restrained.
    support: [bool; 2],
}

impl Joint {
    /// Create an unsupported joint.
    fn new(position: Point) -> Self {
        Self {
            position,
            support: [false, false],
        }
    }
}

/// Container for a planar pin-jointed truss.
#[derive(Debug, Default)]
pub struct Truss {
    /// Underlying graph storage for joints and members.
    graph: Graph<Joint, ()>,
}

/// Member forces and support reactions for a set of load cases.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Member rows in graph edge order.
    members: HashMap<EdgeIndex, usize>,
    /// Restrained degrees of freedom as `(joint, axis)` in row order.
    restrained: Vec<(NodeIndex, usize)>,
    /// Axial force per member (rows) and load case (columns), newtons.
    member_forces: DMatrix<f64>,
    /// Reaction per restrained degree of freedom (rows) and load case (columns).
    reactions: DMatrix<f64>,
}

impl Solution {
    /// Number of load cases that were solved.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.member_forces.ncols()
    }

    /// Axial force in `member` for load case `case`, tension positive.
    #[must_use]
    pub fn member_force(&self, member: EdgeIndex, case: usize) -> Option<f64> {
        let row = *self.members.get(&member)?;
        (case < self.case_count()).then(|| self.member_forces[(row, case)])
    }

    /// Support reaction at `joint` for load case `case`.
    ///
    /// Unrestrained components, and joints without supports, report zero.
    #[must_use]
    pub fn reaction(&self, joint: NodeIndex, case: usize) -> Force {
        let mut reaction = Vector2::zeros();
        if case < self.case_count() {
            for (row, &(node, axis)) in self.restrained.iter().enumerate() {
                if node == joint {
                    reaction[axis] = self.reactions[(row, case)];
                }
            }
        }
        Force::from(reaction)
    }
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use kjoint::Truss;
    ///
    /// let truss = Truss::new();
    /// assert_eq!(truss.joint_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Return the number of joints in the truss.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a new joint to the truss.
    pub fn add_joint(&mut self, position: Point) -> NodeIndex {
        self.graph.add_node(Joint::new(position))
    }

    /// Connect two joints with a new member.
    pub fn add_member(&mut self, start: NodeIndex, end: NodeIndex) -> EdgeIndex {
        self.graph.add_edge(start, end, ())
    }

    /// Set the restraint state for a joint.
    ///
    /// Each entry in `support` corresponds to the X and Y directions respectively. A
    /// value of `true` indicates that the degree of freedom is fixed.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn set_support(
        &mut self,
        joint: NodeIndex,
        support: [bool; 2],
    ) -> Result<(), AnalysisError> {
        let node = self
            .graph
            .node_weight_mut(joint)
            .ok_or(AnalysisError::UnknownJoint(joint))?;
        node.support = support;
        Ok(())
    }

    /// Position of a joint.
    #[must_use]
    pub fn joint_position(&self, joint: NodeIndex) -> Option<Point> {
        self.graph.node_weight(joint).map(|joint| joint.position)
    }

    /// Start and end joints of a member.
    #[must_use]
    pub fn member_endpoints(&self, member: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(member)
    }

    /// Solve member forces and support reactions for every load case in `cases`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] when a load references an unknown joint, a member
    /// has zero length, the system is not square, or the geometry is unstable.
    ///
    /// # Examples
    /// ```
    /// use kjoint::{force, point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// let a = truss.add_joint(point(0.0, 0.0));
    /// let b = truss.add_joint(point(2.0, 0.0));
    /// let c = truss.add_joint(point(1.0, 1.0));
    /// truss.set_support(a, [true, true])?;
    /// truss.set_support(b, [false, true])?;
    /// let ab = truss.add_member(a, b);
    /// truss.add_member(b, c);
    /// truss.add_member(a, c);
    ///
    /// let solution = truss.evaluate(&[vec![(c, force(0.0, -10.0))]])?;
    /// assert!((solution.member_force(ab, 0).unwrap() - 5.0).abs() < 1e-9);
    /// # Ok::<(), kjoint::AnalysisError>(())
    /// ```
    pub fn evaluate(&self, cases: &[JointLoads]) -> Result<Solution, AnalysisError> {
        let index_map = self.node_index_map();
        let members: Vec<EdgeIndex> = self.graph.edge_indices().collect();
        let restrained = self.collect_restrained_dofs();

        let equations = self.joint_count() * 2;
        let unknowns = members.len() + restrained.len();
        if unknowns > equations {
            return Err(AnalysisError::StaticallyIndeterminate {
                equations,
                unknowns,
            });
        }
        if unknowns < equations {
            return Err(AnalysisError::Mechanism {
                equations,
                unknowns,
            });
        }

        let matrix = self.build_equilibrium_matrix(&index_map, &members, &restrained)?;
        let loads = self.build_load_matrix(&index_map, cases)?;
        let unknown_values = matrix
            .lu()
            .solve(&loads)
            .filter(|values| values.iter().all(|value| value.is_finite()))
            .ok_or(AnalysisError::UnstableGeometry)?;

        let member_forces = unknown_values.rows(0, members.len()).into_owned();
        let reactions = unknown_values
            .rows(members.len(), restrained.len())
            .into_owned();

        Ok(Solution {
            members: members
                .into_iter()
                .enumerate()
                .map(|(row, member)| (member, row))
                .collect(),
            restrained,
            member_forces,
            reactions,
        })
    }

    /// Net force on `joint` from member forces, reactions and `loads` for one case.
    ///
    /// A correct solution leaves a residual of zero at every joint.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn joint_residual(
        &self,
        joint: NodeIndex,
        solution: &Solution,
        loads: &JointLoads,
        case: usize,
    ) -> Result<Force, AnalysisError> {
        if self.graph.node_weight(joint).is_none() {
            return Err(AnalysisError::UnknownJoint(joint));
        }
        let mut residual = solution.reaction(joint, case).to_vector();
        for &(node, load) in loads {
            if node == joint {
                residual += load.to_vector();
            }
        }
        for member in self.graph.edge_indices() {
            let Some((start, end)) = self.graph.edge_endpoints(member) else {
                continue;
            };
            if start != joint && end != joint {
                continue;
            }
            let direction = self.member_direction(member, start, end)?;
            let tension = solution.member_force(member, case).unwrap_or(0.0);
            if start == joint {
                residual += direction * tension;
            } else {
                residual -= direction * tension;
            }
        }
        Ok(Force::from(residual))
    }

    /// Support reactions that hold the truss, as a rigid body, against a single
    /// force `load` applied at `at`.
    ///
    /// The supports must restrain exactly three degrees of freedom. Returns one
    /// entry per supported joint.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnsupportedSupports`] for any other support count and
    /// [`AnalysisError::UnstableGeometry`] when the supports cannot resist rotation.
    pub fn rigid_body_reactions(
        &self,
        at: Point,
        load: Force,
    ) -> Result<Vec<(NodeIndex, Force)>, AnalysisError> {
        let restrained = self.collect_restrained_dofs();
        if restrained.len() != 3 {
            return Err(AnalysisError::UnsupportedSupports(restrained.len()));
        }

        // Rows: sum of x forces, sum of y forces, moment about the origin.
        let mut matrix = Matrix3::zeros();
        for (col, &(joint, axis)) in restrained.iter().enumerate() {
            let position = self.graph[joint].position;
            matrix[(axis, col)] = 1.0;
            matrix[(2, col)] = if axis == 0 { -position.y } else { position.x };
        }
        let rhs = -Vector3::new(load.x, load.y, at.x * load.y - at.y * load.x);
        let values = matrix
            .lu()
            .solve(&rhs)
            .filter(|values| values.iter().all(|value| value.is_finite()))
            .ok_or(AnalysisError::UnstableGeometry)?;

        let mut reactions: Vec<(NodeIndex, Force)> = Vec::new();
        for (row, &(joint, axis)) in restrained.iter().enumerate() {
            let index = match reactions.iter().position(|(node, _)| *node == joint) {
                Some(index) => index,
                None => {
                    reactions.push((joint, Force::default()));
                    reactions.len() - 1
                }
            };
            let entry = &mut reactions[index].1;
            if axis == 0 {
                entry.x = values[row];
            } else {
                entry.y = values[row];
            }
        }
        Ok(reactions)
    }

    /// Construct a mapping from graph indices to contiguous joint indices.
    fn node_index_map(&self) -> HashMap<NodeIndex, usize> {
        self.graph
            .node_indices()
            .enumerate()
            .map(|(idx, node)| (node, idx))
            .collect()
    }

    /// Determine the restrained degrees of freedom in graph order.
    fn collect_restrained_dofs(&self) -> Vec<(NodeIndex, usize)> {
        let mut restrained = Vec::new();
        for node in self.graph.node_indices() {
            let joint = &self.graph[node];
            for axis in 0..2 {
                if joint.support[axis] {
                    restrained.push((node, axis));
                }
            }
        }
        restrained
    }

    /// Unit vector pointing from the start to the end joint of a member.
    fn member_direction(
        &self,
        member: EdgeIndex,
        start: NodeIndex,
        end: NodeIndex,
    ) -> Result<Vector2<f64>, AnalysisError> {
        let delta = self.graph[end].position.to_vector() - self.graph[start].position.to_vector();
        let length = delta.norm();
        if length == 0.0 {
            return Err(AnalysisError::ZeroLengthMember(member));
        }
        Ok(delta / length)
    }

    /// Assemble the joint equilibrium matrix.
    ///
    /// A tensile member pulls its start joint towards its end joint and the end
    /// joint towards its start joint.
    fn build_equilibrium_matrix(
        &self,
        index_map: &HashMap<NodeIndex, usize>,
        members: &[EdgeIndex],
        restrained: &[(NodeIndex, usize)],
    ) -> Result<DMatrix<f64>, AnalysisError> {
        let size = self.joint_count() * 2;
        let mut matrix = DMatrix::zeros(size, size);
        for (col, &member) in members.iter().enumerate() {
            let (start, end) = self
                .graph
                .edge_endpoints(member)
                .ok_or(AnalysisError::ZeroLengthMember(member))?;
            let direction = self.member_direction(member, start, end)?;
            let start_row = index_map[&start] * 2;
            let end_row = index_map[&end] * 2;
            for axis in 0..2 {
                matrix[(start_row + axis, col)] += direction[axis];
                matrix[(end_row + axis, col)] -= direction[axis];
            }
        }
        for (offset, &(joint, axis)) in restrained.iter().enumerate() {
            matrix[(index_map[&joint] * 2 + axis, members.len() + offset)] = 1.0;
        }
        Ok(matrix)
    }

    /// Assemble the right-hand side, one column per load case.
    fn build_load_matrix(
        &self,
        index_map: &HashMap<NodeIndex, usize>,
        cases: &[JointLoads],
    ) -> Result<DMatrix<f64>, AnalysisError> {
        let mut loads = DMatrix::zeros(self.joint_count() * 2, cases.len());
        for (case, joint_loads) in cases.iter().enumerate() {
            for &(joint, load) in joint_loads {
                let base = index_map
                    .get(&joint)
                    .ok_or(AnalysisError::UnknownJoint(joint))?
                    * 2;
                loads[(base, case)] -= load.x;
                loads[(base + 1, case)] -= load.y;
            }
        }
        Ok(loads)
    }
}
