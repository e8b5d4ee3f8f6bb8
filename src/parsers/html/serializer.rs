use std::io;

use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

/// 序列化文档，并按文档编码重新编码
pub fn serialize_document(dom: &RcDom, document_encoding: &str) -> io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        if encoding != encoding_rs::UTF_8 {
            let s = String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(&s);
            buf = data.into_owned();
        }
    }

    Ok(buf)
}

/// 序列化为 UTF-8 字符串
pub fn serialize_to_string(dom: &RcDom) -> io::Result<String> {
    let buf = serialize_document(dom, "utf-8")?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
