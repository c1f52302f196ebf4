//! # Arm library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the arm crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm driver - closed-loop actuation of both joints
pub mod arm_driver;

/// Behaviours - ultrasonic follower, line follower and joystick teleoperation
pub mod behaviour;

/// Joint control module - position control of a single joint
pub mod joint_ctrl;

/// Kinematics model - conversion between joint angles and end effector position
pub mod kinematics;

/// Motion sequencer - runs the arm through its operating phases
pub mod motion_seq;

/// Executable parameters
pub mod params;

/// Simulated equipment
pub mod sim;
