//! Detection to instruction table

use crate::types::{Command, Detection, NavigationCommand, Position, Severity, SurfaceType};

pub const PATH_LOST: &str = "Path lost.";
pub const INTERSECTION: &str = "Intersection detected.";
pub const GO_STRAIGHT: &str = "Go straight.";
pub const STAY_LEFT: &str = "Stay on left.";
pub const STAY_RIGHT: &str = "Stay on right.";

/// Map a detection to the instruction for the walker.
///
/// Priority: lost path, then intersection marker, then lateral position.
/// An intersection is never hidden behind a steering hint.
pub fn navigate(detection: &Detection) -> NavigationCommand {
    if !detection.found {
        return NavigationCommand::new(Command::Stop, PATH_LOST, Severity::Warning);
    }

    if detection.surface_type == SurfaceType::Dots {
        return NavigationCommand::new(Command::Intersection, INTERSECTION, Severity::Alert);
    }

    match detection.position {
        Position::Left => NavigationCommand::new(Command::Left, STAY_LEFT, Severity::Info),
        Position::Right => NavigationCommand::new(Command::Right, STAY_RIGHT, Severity::Info),
        // found frames never carry Unknown; treat it like the dead zone
        Position::Center | Position::Unknown => {
            NavigationCommand::new(Command::Straight, GO_STRAIGHT, Severity::Info)
        }
    }
}
