//! Error handling for joint configuration.
//!
//! Every setter and constructor validates its inputs. An invalid value is rejected: the
//! joint is left untouched, the error is reported through the global error handler and
//! returned to the caller. The per-step solver-prep and projection functions never fail.
//!
//! Setting [`GLOBAL_ERROR_HANDLER`] lets the end user decide how rejected configurations
//! are reported.
//!
//! Its default behaviour is to log the error at the `warn` level.

use std::sync::OnceLock;

use log::warn;

/// Configuration errors detected when building or modifying a joint.
///
/// The string payload names the operation that rejected the value.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum JointError {
    /// A transform is not finite, or its rotation is not a unit quaternion.
    #[error("{0}: invalid transform (non-finite or non-unit rotation)")]
    InvalidTransform(&'static str),
    /// A limit has inconsistent bounds or parameters.
    #[error("{0}: invalid limit")]
    InvalidLimit(&'static str),
    /// A drive has a negative or non-finite coefficient.
    #[error("{0}: invalid drive")]
    InvalidDrive(&'static str),
    /// A scalar parameter is out of range or not finite.
    #[error("{0}: invalid parameter")]
    InvalidParameter(&'static str),
    /// A joint is attached to a body whose pose was not provided.
    #[error("joint attached to body {index}, but only {num_poses} body poses were given")]
    MissingBodyPose {
        /// The index of the body without a pose.
        index: usize,
        /// The number of poses given.
        num_poses: usize,
    },
    /// A joint cannot attach a body to itself.
    #[error("a joint cannot attach a body to itself")]
    SameBody,
}

/// A global error handler. This can be set at startup, as long as it is set before
/// any uses.
///
/// # Example
///
/// ```
/// use rapier3d_joint_prep::error_handler::{GLOBAL_ERROR_HANDLER, panic};
/// GLOBAL_ERROR_HANDLER.set(Box::new(panic)).map_err(|_| ()).expect("The error handler can only be set once, globally.");
/// ```
pub static GLOBAL_ERROR_HANDLER: OnceLock<Box<dyn Fn(JointError) + Sync + Send>> =
    OnceLock::new();

/// The default error handler. This defaults to [`warn()`].
#[inline]
pub fn default_error_handler() -> &'static dyn Fn(JointError) {
    GLOBAL_ERROR_HANDLER.get_or_init(|| Box::new(warn))
}

/// Error handler that panics with the error.
#[track_caller]
#[inline(always)]
pub fn panic(error: JointError) {
    panic!("Encountered an error:\n{}", error);
}

/// Error handler that logs the error at the `warn` level.
#[track_caller]
#[inline]
pub fn warn(error: JointError) {
    warn!("Encountered an error:\n{}", error);
}

/// Reports `error` through the global handler and hands it back, ready to be returned.
pub(crate) fn reject<T>(error: JointError) -> Result<T, JointError> {
    default_error_handler()(error);
    Err(error)
}

#[cfg(test)]
mod test {
    use super::{reject, JointError};

    #[test]
    fn rejected_errors_are_returned() {
        let result: Result<(), _> = reject(JointError::InvalidLimit("set_limit"));
        assert_eq!(result, Err(JointError::InvalidLimit("set_limit")));
    }

    #[test]
    fn error_messages_name_the_operation() {
        assert_eq!(
            JointError::InvalidDrive("set_drive").to_string(),
            "set_drive: invalid drive"
        );
        assert_eq!(
            JointError::SameBody.to_string(),
            "a joint cannot attach a body to itself"
        );
    }
}
