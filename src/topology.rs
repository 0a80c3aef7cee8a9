//! Layout of the K-truss described as data.
//!
//! The half-truss is a Warren girder cantilevered from two wall supports:
//!
//! ```text
//!   A ----- C ------------- E ------------- G
//!   |     /   \           /   \           / |
//!   |   /       \       /       \       /   |
//!   | /           \   /           \   /     |
//!   B --------------- D ------------- F --- H
//!                                           v load
//! ```
//!
//! Node coordinates are stored in panel widths `a` (x) and truss heights `b` (y)
//! and scaled when the model is built. `A` is pinned, `B` is a roller that only
//! restrains horizontal movement, and the live load acts at `H`.

use nalgebra::Vector2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::errors::{DesignError, DesignResult};
use crate::geometry::{point, MemberClass, Point};
use crate::truss::Truss;

/// A joint of the layout in scaled coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSpec {
    /// Single-letter joint label.
    pub label: &'static str,
    /// Horizontal position in panel widths.
    pub x: f64,
    /// Vertical position in truss heights.
    pub y: f64,
}

/// How a support restrains its joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// Restrains both directions.
    Pinned,
    /// Restrains the horizontal direction only.
    Roller,
}

impl Support {
    /// Restraint flags for the X and Y directions.
    #[must_use]
    pub const fn restraint(self) -> [bool; 2] {
        match self {
            Support::Pinned => [true, true],
            Support::Roller => [true, false],
        }
    }
}

/// A member of the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberSpec {
    /// Start joint label.
    pub start: &'static str,
    /// End joint label.
    pub end: &'static str,
    /// Section family.
    pub class: MemberClass,
}

impl MemberSpec {
    /// Two-letter member label such as `"BD"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.start, self.end)
    }
}

/// Complete layout: joints, members, supports and the loaded joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Topology {
    /// Joints in insertion order.
    pub nodes: &'static [NodeSpec],
    /// Members in table order.
    pub members: &'static [MemberSpec],
    /// Pinned support joint.
    pub pinned: &'static str,
    /// Roller support joint.
    pub roller: &'static str,
    /// Joint carrying the live load.
    pub load_joint: &'static str,
}

/// Shorthand for a [`NodeSpec`].
const fn node(label: &'static str, x: f64, y: f64) -> NodeSpec {
    NodeSpec { label, x, y }
}

/// Shorthand for a chord [`MemberSpec`].
const fn chord(start: &'static str, end: &'static str) -> MemberSpec {
    MemberSpec {
        start,
        end,
        class: MemberClass::Chord,
    }
}

/// Shorthand for a brace [`MemberSpec`].
const fn brace(start: &'static str, end: &'static str) -> MemberSpec {
    MemberSpec {
        start,
        end,
        class: MemberClass::Brace,
    }
}

/// The K-truss half-span. Members are listed chords first, top then bottom.
pub const K_TRUSS: Topology = Topology {
    nodes: &[
        node("A", 0.0, 1.0),
        node("B", 0.0, 0.0),
        node("C", 1.0, 1.0),
        node("D", 2.0, 0.0),
        node("E", 3.0, 1.0),
        node("F", 4.0, 0.0),
        node("G", 5.0, 1.0),
        node("H", 5.0, 0.0),
    ],
    members: &[
        chord("A", "C"),
        chord("C", "E"),
        chord("E", "G"),
        chord("B", "D"),
        chord("D", "F"),
        chord("F", "H"),
        brace("A", "B"),
        brace("B", "C"),
        brace("C", "D"),
        brace("D", "E"),
        brace("E", "F"),
        brace("F", "G"),
        brace("G", "H"),
    ],
    pinned: "A",
    roller: "B",
    load_joint: "H",
};

/// A member of a built model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMember {
    /// Two-letter label.
    pub label: String,
    /// Section family.
    pub class: MemberClass,
    /// Edge in the underlying truss.
    pub index: EdgeIndex,
}

/// A layout scaled to real dimensions, ready to solve.
#[derive(Debug)]
pub struct TrussModel {
    /// Underlying truss with supports applied.
    truss: Truss,
    /// Joint labels and indices in layout order.
    joints: Vec<(&'static str, NodeIndex)>,
    /// Members in layout order.
    members: Vec<ModelMember>,
    /// Pinned support joint.
    pinned: NodeIndex,
    /// Roller support joint.
    roller: NodeIndex,
    /// Loaded joint.
    load_joint: NodeIndex,
}

impl Topology {
    /// Scale the layout by `panel_width` and `height` (metres) and build the truss.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnknownMember`] when a member or support names a joint
    /// that the layout does not define.
    pub fn build(&self, panel_width: f64, height: f64) -> DesignResult<TrussModel> {
        let mut truss = Truss::new();
        let joints: Vec<(&'static str, NodeIndex)> = self
            .nodes
            .iter()
            .map(|spec| {
                let index = truss.add_joint(point(spec.x * panel_width, spec.y * height));
                (spec.label, index)
            })
            .collect();
        let find = |label: &str| {
            joints
                .iter()
                .find(|(name, _)| *name == label)
                .map(|(_, index)| *index)
                .ok_or_else(|| DesignError::UnknownMember(label.to_owned()))
        };

        let mut members = Vec::with_capacity(self.members.len());
        for spec in self.members {
            let index = truss.add_member(find(spec.start)?, find(spec.end)?);
            members.push(ModelMember {
                label: spec.label(),
                class: spec.class,
                index,
            });
        }

        let pinned = find(self.pinned)?;
        let roller = find(self.roller)?;
        let load_joint = find(self.load_joint)?;
        truss.set_support(pinned, Support::Pinned.restraint())?;
        truss.set_support(roller, Support::Roller.restraint())?;

        Ok(TrussModel {
            truss,
            joints,
            members,
            pinned,
            roller,
            load_joint,
        })
    }
}

impl TrussModel {
    /// Underlying truss.
    #[must_use]
    pub fn truss(&self) -> &Truss {
        &self.truss
    }

    /// Members in table order.
    #[must_use]
    pub fn members(&self) -> &[ModelMember] {
        &self.members
    }

    /// Look up a member by label.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::UnknownMember`] when no member has that label.
    pub fn member(&self, label: &str) -> DesignResult<&ModelMember> {
        self.members
            .iter()
            .find(|member| member.label.eq_ignore_ascii_case(label))
            .ok_or_else(|| DesignError::UnknownMember(label.to_owned()))
    }

    /// Pinned support joint.
    #[must_use]
    pub fn pinned_support(&self) -> NodeIndex {
        self.pinned
    }

    /// Roller support joint.
    #[must_use]
    pub fn roller_support(&self) -> NodeIndex {
        self.roller
    }

    /// Joint carrying the live load.
    #[must_use]
    pub fn load_joint(&self) -> NodeIndex {
        self.load_joint
    }

    /// Positions of every joint.
    fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.joints
            .iter()
            .filter_map(|(_, index)| self.truss.joint_position(*index))
    }

    /// Centre of the half-truss bounding box, where its self-weight acts.
    #[must_use]
    pub fn centroid(&self) -> Point {
        let (min, max) = self.positions().fold(
            (
                Vector2::repeat(f64::INFINITY),
                Vector2::repeat(f64::NEG_INFINITY),
            ),
            |(min, max), p| (min.inf(&p.to_vector()), max.sup(&p.to_vector())),
        );
        Point::from((min + max) / 2.0)
    }

    /// The four members meeting at a K-joint, ordered left side first and chord
    /// before brace on each side.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::NotAKJoint`] unless exactly one chord and one brace
    /// arrive from each side of the joint.
    pub fn k_joint_roles(&self, joint: &str) -> DesignResult<[ModelMember; 4]> {
        let not_k_joint = || DesignError::NotAKJoint(joint.to_owned());
        let (_, index) = *self
            .joints
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(joint))
            .ok_or_else(not_k_joint)?;
        let origin = self.truss.joint_position(index).ok_or_else(not_k_joint)?;

        let mut left = Vec::new();
        let mut right = Vec::new();
        for member in &self.members {
            let Some((start, end)) = self.truss.member_endpoints(member.index) else {
                continue;
            };
            let other = match (start == index, end == index) {
                (true, _) => end,
                (_, true) => start,
                _ => continue,
            };
            let other_x = self
                .truss
                .joint_position(other)
                .ok_or_else(not_k_joint)?
                .x;
            if other_x < origin.x {
                left.push(member.clone());
            } else if other_x > origin.x {
                right.push(member.clone());
            } else {
                return Err(not_k_joint());
            }
        }

        let side = |members: Vec<ModelMember>| -> DesignResult<[ModelMember; 2]> {
            let mut chord = None;
            let mut brace = None;
            for member in members {
                let slot = match member.class {
                    MemberClass::Chord => &mut chord,
                    MemberClass::Brace => &mut brace,
                };
                if slot.replace(member).is_some() {
                    return Err(not_k_joint());
                }
            }
            Ok([chord.ok_or_else(not_k_joint)?, brace.ok_or_else(not_k_joint)?])
        };
        let [left_chord, left_brace] = side(left)?;
        let [right_chord, right_brace] = side(right)?;
        Ok([left_chord, left_brace, right_chord, right_brace])
    }
}
