// ABOUTME: WCAG AA contrast stepping and the live-surface correction pass built on it
// ABOUTME: The stepper is pure; the enforcer reads a surface, plans, then writes once

pub mod enforcer;
pub mod stepper;

pub use enforcer::{ComplianceEnforcer, Correction};
pub use stepper::{AaStepper, CoreFallback, ScaleStart, find_aa_compliant_color};
