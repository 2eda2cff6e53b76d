use std::io::BufRead;

use crate::error::ExecError;

use super::Reply;

/// Reads one reply from the stream, blocking until it is complete.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply, ExecError> {
    let line = read_line(reader)?;
    let Some(marker) = line.bytes().next() else {
        return Err(ExecError::Protocol("empty reply line".to_string()));
    };
    let rest = &line[1..];

    match marker {
        b'+' => Ok(Reply::Simple(rest.to_string())),
        b'-' => Ok(Reply::Error(rest.to_string())),
        b':' => Ok(Reply::Integer(parse_i64(rest)?)),
        b'$' => read_bulk(reader, parse_i64(rest)?),
        b'*' => read_array(reader, parse_i64(rest)?),
        _ => Err(ExecError::Protocol(format!(
            "unknown reply marker {:?}",
            marker as char
        ))),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, len: i64) -> Result<Reply, ExecError> {
    if len < 0 {
        return Ok(Reply::Nil);
    }

    let len = len as usize;
    let mut data = vec![0u8; len + 2]; // payload plus trailing \r\n
    reader.read_exact(&mut data)?;
    if &data[len..] != b"\r\n" {
        return Err(ExecError::Protocol("bulk string missing crlf".to_string()));
    }
    data.truncate(len);
    Ok(Reply::Bulk(data))
}

fn read_array<R: BufRead>(reader: &mut R, len: i64) -> Result<Reply, ExecError> {
    if len < 0 {
        return Ok(Reply::Nil);
    }

    let mut items = Vec::with_capacity(len as usize);
    for _ in 0..len {
        items.push(read_reply(reader)?);
    }
    Ok(Reply::Array(items))
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String, ExecError> {
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Err(ExecError::Protocol("unexpected end of stream".to_string()));
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(ExecError::Protocol("reply line missing crlf".to_string()));
    }
    buf.truncate(buf.len() - 2);
    String::from_utf8(buf).map_err(|_| ExecError::Protocol("reply line not utf-8".to_string()))
}

fn parse_i64(text: &str) -> Result<i64, ExecError> {
    text.parse()
        .map_err(|_| ExecError::Protocol(format!("invalid length or integer {text:?}")))
}
