//! Deterministic UUIDv5 identifiers for install batches.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `batch_id` is reproducible across runs for the same mod list and action
//! sequence, independent of the roots the paths resolve against.
use std::fmt::Write;
use uuid::Uuid;

use crate::constants::NS_TAG;

use super::action::{Action, ModDescriptor};

/// Internal: return the UUID namespace used for deterministic IDs.
fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Serialize an action into a stable, human-readable string used for UUIDv5 input.
fn serialize_action(a: &Action) -> String {
    match a {
        Action::CopyFile { target, destination } => format!("C:{target}->{destination}"),
        Action::CopyFiles { target_directory, destination, file_filter, include_subfolders } => {
            format!("CB:{target_directory}->{destination}#{file_filter}#{include_subfolders}")
        }
        Action::MoveFile { target, destination } => format!("M:{target}->{destination}"),
        Action::MoveFiles { target_directory, destination, file_filter, include_subfolders } => {
            format!("MB:{target_directory}->{destination}#{file_filter}#{include_subfolders}")
        }
        Action::ReplaceFile { target, replacement } => format!("R:{target}<-{replacement}"),
        Action::ReplaceFiles { target_directory, destination, file_filter, include_subfolders } => {
            format!("RB:{target_directory}->{destination}#{file_filter}#{include_subfolders}")
        }
        Action::DeleteFiles { targets } => {
            let mut s = String::from("D:");
            for t in targets {
                let _ = write!(s, "{t};");
            }
            s
        }
        Action::WriteToFile { target, content } => {
            let mut s = format!("W:{target}");
            for c in content {
                let _ = write!(
                    s,
                    "@{}..{:?}r{}",
                    c.start_offset, c.end_offset, c.replace
                );
            }
            s
        }
        Action::ExtractArchive { targets, delete_when_complete } => {
            let mut s = String::from("X:");
            for t in targets {
                let _ = write!(s, "{t};");
            }
            let _ = write!(s, "#{delete_when_complete}");
            s
        }
        Action::DecompileScript { targets } => {
            let mut s = String::from("U:");
            for t in targets {
                let _ = write!(s, "{t};");
            }
            s
        }
    }
}

/// Compute a deterministic UUIDv5 for an install batch by serializing every
/// mod's ID and action sequence in order.
///
/// Two batches with identical mod lists (including ordering) have the same
/// `batch_id`, independent of the directories involved.
#[must_use]
pub fn batch_id(mods: &[ModDescriptor]) -> Uuid {
    let ns = namespace();
    let mut s = String::new();
    for m in mods {
        s.push_str(&m.id.0);
        s.push('\n');
        for a in &m.actions {
            s.push_str(&serialize_action(a));
            s.push('\n');
        }
    }
    Uuid::new_v5(&ns, s.as_bytes())
}
