//! Calculator state documents produced by the graph compiler: loading,
//! validation, input injection and the byte-list codecs on both ends.

mod codec;
mod document;
mod error;
mod inject;
mod vars;

pub use codec::{
    decode_output_list, decode_stdin_expression, encode_byte_list, stdin_expression,
    stdin_placeholder, OutputError,
};
pub use document::{load_state_file, parse_state, ProgramState};
pub use error::StateError;
pub use inject::inject_input;
pub use vars::VariableNames;
