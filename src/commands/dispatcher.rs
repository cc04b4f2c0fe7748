//! Request Dispatcher
//!
//! The dispatcher is the single entry point from the transport into the
//! command layer. For each request it:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ uppercase +  │──>│ arity check  │──>│   handler    │──>│ Result into  │
//! │ table lookup │   │              │   │ (parse, route│   │    Reply     │
//! └──────────────┘   └──────────────┘   │  1 backend)  │   └──────────────┘
//!                                       └──────────────┘
//! ```
//!
//! Every request yields exactly one [`Reply`]. Failures never escape as
//! panics or `Err`; they become [`Reply::Error`] carrying the message of the
//! [`CommandError`].

use crate::commands::table::CommandTable;
use crate::commands::CommandResult;
use crate::error::CommandError;
use crate::protocol::{Reply, Request};
use crate::router::Router;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Routes requests to their handlers.
///
/// The dispatcher keeps no per-request state and can be shared across
/// connection tasks behind an `Arc`.
///
/// # Example
///
/// ```
/// use rstore::commands::Dispatcher;
/// use rstore::protocol::{Reply, Request};
/// use rstore::router::PartitionRouter;
/// use std::sync::Arc;
///
/// let dispatcher = Dispatcher::new(Arc::new(PartitionRouter::in_memory(4)));
/// let reply = dispatcher.dispatch(&Request::from_parts(&["INCR", "visits"]));
/// assert_eq!(reply, Reply::Integer(1));
/// ```
pub struct Dispatcher {
    table: CommandTable,
    router: Arc<dyn Router>,
}

impl Dispatcher {
    /// Creates a dispatcher with the full command table.
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self {
            table: CommandTable::new(),
            router,
        }
    }

    /// The command table used for lookups.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Executes a request and returns the reply to send back.
    pub fn dispatch(&self, request: &Request) -> Reply {
        match self.execute(request) {
            Ok(reply) => reply,
            Err(err) => {
                match &err {
                    CommandError::UnknownCommand(token) => {
                        debug!(command = %token, "Unknown command");
                    }
                    CommandError::Backend(cause) => {
                        warn!(command = %request.command(), error = %cause, "Backend operation failed");
                    }
                    CommandError::PartitionResolution(cause) => {
                        warn!(command = %request.command(), error = %cause, "Partition lookup failed");
                    }
                    _ => {
                        trace!(command = %request.command(), error = %err, "Rejected request");
                    }
                }
                Reply::error(err.to_string())
            }
        }
    }

    /// Executes a request, keeping the error typed.
    pub fn execute(&self, request: &Request) -> CommandResult {
        let name = request.command().to_ascii_uppercase();
        let spec = self
            .table
            .get(&name)
            .ok_or_else(|| CommandError::UnknownCommand(request.command().to_string()))?;

        let args = request.params();
        if !spec.arity.accepts(args.len()) {
            return Err(CommandError::WrongArgumentCount(spec.name));
        }

        trace!(command = spec.name, args = args.len(), "Dispatching command");
        (spec.handler)(self.router.as_ref(), args)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.table.len())
            .finish()
    }
}
