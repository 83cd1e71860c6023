pub use self::cone_limit_helper::{ellipse_clamp, ConeLimitHelper};
pub use self::constraint_row::{
    ConstraintRow, JointRows, RowFlags, RowModifiers, SolveHint, SolverPrepOutput,
    MAX_JOINT_ROWS,
};
pub use self::d6_joint_constraint::{d6_project, d6_solver_prep};
pub use self::fixed_joint_constraint::{fixed_project, fixed_solver_prep};
pub use self::joint_constraint_builder::{
    compute_jacobian_axes, JointConstraintBuilder, JointFrames,
};
pub use self::joint_projection::{
    angular_project, project_transforms, truncate_angular, truncate_linear, ProjectedBody,
};
pub use self::joint_shader_table::{
    ConstraintFlags, JointShaderTable, ProjectFn, SolverPrepFn,
};
pub use self::prismatic_joint_constraint::{prismatic_project, prismatic_solver_prep};
pub use self::revolute_joint_constraint::{revolute_project, revolute_solver_prep};
pub use self::spherical_joint_constraint::{spherical_project, spherical_solver_prep};

mod cone_limit_helper;
mod constraint_row;
mod d6_joint_constraint;
mod fixed_joint_constraint;
mod joint_constraint_builder;
mod joint_projection;
mod joint_shader_table;
mod prismatic_joint_constraint;
mod revolute_joint_constraint;
mod spherical_joint_constraint;
