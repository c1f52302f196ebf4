//! # Arm interface crate
//!
//! This crate provides the interface between the arm software and the equipment it runs on. The
//! control software never talks to hardware directly, it only calls the capability traits defined
//! in [`eqpt`], which are implemented either by a hardware layer or by the simulation in
//! `arm_exec`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment capability traits and data
pub mod eqpt;
