//! The Protobuf-compatible wire format (spec §4.6): an interoperability
//! codec over the same descriptor model, restricted to the subset of fields
//! Protobuf can actually represent — no positional fields, no pointer graph.

mod reader;
mod writer;

pub use reader::ProtobufReader;
pub use writer::ProtobufWriter;
