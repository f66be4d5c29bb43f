//! Process supervision for `rmapi` invocations.

mod invoker;
mod shutdown;

pub use invoker::{DEFAULT_KILL_GRACE, ProcessInvoker};
pub use shutdown::terminate;
