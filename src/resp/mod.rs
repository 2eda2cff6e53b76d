pub mod reader;
pub mod value;

pub use reader::read_reply;
pub use value::Reply;

use bytes::BytesMut;

/// Encodes one command as a RESP array of bulk strings.
pub fn encode_command(args: &[Vec<u8>], buf: &mut BytesMut) {
    buf.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        buf.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }
}
