//! Domain types shared by the facade, the ports and their adapters.

mod descriptor;
mod entry;
mod intent;
mod invocation;
mod local_file;
mod remote_path;

pub use descriptor::BinaryDescriptor;
pub use entry::{EntryKind, RemoteEntry, parse_listing};
pub use intent::Intent;
pub use invocation::{InvocationResult, InvocationSpec, OperationOutcome};
pub use local_file::validate_local_file;
pub use remote_path::{PAPERS_ROOT, RemotePath};
