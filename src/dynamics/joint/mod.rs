pub use self::d6_joint::{D6Cache, D6DriveMask, D6Joint};
pub use self::fixed_joint::FixedJoint;
pub use self::joint::{Joint, JointBody, JointKind, JointParams};
pub use self::joint_data::{
    DirtyFlags, InvMassScale, JointAxesMask, JointAxis, JointData, JointMotion, JointProjection,
};
pub use self::joint_drive::{D6Drive, JointDrive, JointDriveFlags};
pub use self::joint_limit::{
    JointAngularLimitPair, JointLimitCone, JointLimitParameters, JointLinearLimit,
    JointLinearLimitPair, Spring,
};
pub use self::joint_set::{JointHandle, JointSet, PreparedJoint};
pub use self::prismatic_joint::{PrismaticJoint, PrismaticJointFlags};
pub use self::revolute_joint::{RevoluteCache, RevoluteJoint, RevoluteJointFlags};
pub use self::spherical_joint::{SphericalCache, SphericalJoint, SphericalJointFlags};

mod d6_joint;
mod fixed_joint;
mod joint;
mod joint_data;
mod joint_drive;
mod joint_limit;
mod joint_set;
mod prismatic_joint;
mod revolute_joint;
mod spherical_joint;
