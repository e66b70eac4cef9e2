//! Content headers and the basic-class property list.
//!
//! A content header frame carries the class id, the total body size (the
//! following body frames concatenate to exactly that many bytes) and a
//! property list selected by a flag word, one flag per optional property
//! assigned from bit 15 downward.

use bytes::{Bytes, BytesMut};

use crate::error::Error;
use crate::methods::args::{Reader, Writer};
use crate::methods::CLASS_BASIC;
use crate::value::Table;

const FLAG_CONTENT_TYPE: u16 = 1 << 15;
const FLAG_CONTENT_ENCODING: u16 = 1 << 14;
const FLAG_HEADERS: u16 = 1 << 13;
const FLAG_DELIVERY_MODE: u16 = 1 << 12;
const FLAG_PRIORITY: u16 = 1 << 11;
const FLAG_CORRELATION_ID: u16 = 1 << 10;
const FLAG_REPLY_TO: u16 = 1 << 9;
const FLAG_EXPIRATION: u16 = 1 << 8;
const FLAG_MESSAGE_ID: u16 = 1 << 7;
const FLAG_TIMESTAMP: u16 = 1 << 6;
const FLAG_TYPE: u16 = 1 << 5;
const FLAG_USER_ID: u16 = 1 << 4;
const FLAG_APP_ID: u16 = 1 << 3;
const FLAG_CLUSTER_ID: u16 = 1 << 2;

/// Decoded content header frame payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentHeader {
    /// Class the content belongs to (always the basic class for 0-9-1)
    pub class_id: u16,
    /// Total size of the message body across all body frames
    pub body_size: u64,
    /// Optional message properties
    pub properties: BasicProperties,
}

/// Optional properties of a basic-class message. Unset fields are neither
/// flagged nor encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicProperties {
    /// MIME content type
    pub content_type: Option<Bytes>,
    /// MIME content encoding
    pub content_encoding: Option<Bytes>,
    /// Application headers
    pub headers: Option<Table>,
    /// 1 = non-persistent, 2 = persistent
    pub delivery_mode: Option<u8>,
    /// Message priority, 0 to 9
    pub priority: Option<u8>,
    /// Application correlation identifier
    pub correlation_id: Option<Bytes>,
    /// Address to reply to
    pub reply_to: Option<Bytes>,
    /// Message expiration
    pub expiration: Option<Bytes>,
    /// Application message identifier
    pub message_id: Option<Bytes>,
    /// Message timestamp
    pub timestamp: Option<u64>,
    /// Message type name
    pub message_type: Option<Bytes>,
    /// Creating user id
    pub user_id: Option<Bytes>,
    /// Creating application id
    pub app_id: Option<Bytes>,
    /// Intra-cluster routing identifier
    pub cluster_id: Option<Bytes>,
}

impl ContentHeader {
    /// Creates a basic-class content header.
    pub fn basic(body_size: u64, properties: BasicProperties) -> Self {
        Self {
            class_id: CLASS_BASIC,
            body_size,
            properties,
        }
    }

    /// Decodes a content header frame payload.
    pub fn decode(payload: &Bytes) -> Result<Self, Error> {
        let mut r = Reader::new(payload);
        let class_id = r.u16()?;
        let _weight = r.u16()?;
        let body_size = r.u64()?;
        let flags = r.u16()?;
        if flags & 1 != 0 {
            // 0-9-1 defines no property list spanning multiple flag words
            return Err(Error::BadWireData("unexpected property flag continuation"));
        }

        let mut properties = BasicProperties::default();
        if flags & FLAG_CONTENT_TYPE != 0 {
            properties.content_type = Some(r.shortstr()?);
        }
        if flags & FLAG_CONTENT_ENCODING != 0 {
            properties.content_encoding = Some(r.shortstr()?);
        }
        if flags & FLAG_HEADERS != 0 {
            properties.headers = Some(r.table()?);
        }
        if flags & FLAG_DELIVERY_MODE != 0 {
            properties.delivery_mode = Some(r.u8()?);
        }
        if flags & FLAG_PRIORITY != 0 {
            properties.priority = Some(r.u8()?);
        }
        if flags & FLAG_CORRELATION_ID != 0 {
            properties.correlation_id = Some(r.shortstr()?);
        }
        if flags & FLAG_REPLY_TO != 0 {
            properties.reply_to = Some(r.shortstr()?);
        }
        if flags & FLAG_EXPIRATION != 0 {
            properties.expiration = Some(r.shortstr()?);
        }
        if flags & FLAG_MESSAGE_ID != 0 {
            properties.message_id = Some(r.shortstr()?);
        }
        if flags & FLAG_TIMESTAMP != 0 {
            properties.timestamp = Some(r.u64()?);
        }
        if flags & FLAG_TYPE != 0 {
            properties.message_type = Some(r.shortstr()?);
        }
        if flags & FLAG_USER_ID != 0 {
            properties.user_id = Some(r.shortstr()?);
        }
        if flags & FLAG_APP_ID != 0 {
            properties.app_id = Some(r.shortstr()?);
        }
        if flags & FLAG_CLUSTER_ID != 0 {
            properties.cluster_id = Some(r.shortstr()?);
        }

        Ok(Self {
            class_id,
            body_size,
            properties,
        })
    }

    /// Appends the content header frame payload to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), Error> {
        let p = &self.properties;
        let mut flags = 0u16;
        if p.content_type.is_some() {
            flags |= FLAG_CONTENT_TYPE;
        }
        if p.content_encoding.is_some() {
            flags |= FLAG_CONTENT_ENCODING;
        }
        if p.headers.is_some() {
            flags |= FLAG_HEADERS;
        }
        if p.delivery_mode.is_some() {
            flags |= FLAG_DELIVERY_MODE;
        }
        if p.priority.is_some() {
            flags |= FLAG_PRIORITY;
        }
        if p.correlation_id.is_some() {
            flags |= FLAG_CORRELATION_ID;
        }
        if p.reply_to.is_some() {
            flags |= FLAG_REPLY_TO;
        }
        if p.expiration.is_some() {
            flags |= FLAG_EXPIRATION;
        }
        if p.message_id.is_some() {
            flags |= FLAG_MESSAGE_ID;
        }
        if p.timestamp.is_some() {
            flags |= FLAG_TIMESTAMP;
        }
        if p.message_type.is_some() {
            flags |= FLAG_TYPE;
        }
        if p.user_id.is_some() {
            flags |= FLAG_USER_ID;
        }
        if p.app_id.is_some() {
            flags |= FLAG_APP_ID;
        }
        if p.cluster_id.is_some() {
            flags |= FLAG_CLUSTER_ID;
        }

        let mut w = Writer::new(dst);
        w.u16(self.class_id);
        w.u16(0); // weight, always zero
        w.u64(self.body_size);
        w.u16(flags);

        if let Some(v) = &p.content_type {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.content_encoding {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.headers {
            w.table(v)?;
        }
        if let Some(v) = p.delivery_mode {
            w.u8(v);
        }
        if let Some(v) = p.priority {
            w.u8(v);
        }
        if let Some(v) = &p.correlation_id {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.reply_to {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.expiration {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.message_id {
            w.shortstr(v)?;
        }
        if let Some(v) = p.timestamp {
            w.u64(v);
        }
        if let Some(v) = &p.message_type {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.user_id {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.app_id {
            w.shortstr(v)?;
        }
        if let Some(v) = &p.cluster_id {
            w.shortstr(v)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_property_list_roundtrips() {
        let header = ContentHeader::basic(42, BasicProperties::default());
        let mut dst = BytesMut::new();
        header.encode(&mut dst).unwrap();
        // class id, weight, body size, flag word
        assert_eq!(dst.len(), 2 + 2 + 8 + 2);
        let decoded = ContentHeader::decode(&dst.freeze()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn populated_properties_roundtrip() {
        let mut headers = Table::new();
        headers.insert("retries", 3i32);
        let properties = BasicProperties {
            content_type: Some(Bytes::from_static(b"application/json")),
            delivery_mode: Some(2),
            priority: Some(5),
            correlation_id: Some(Bytes::from_static(b"corr-1")),
            timestamp: Some(1_700_000_000),
            headers: Some(headers),
            app_id: Some(Bytes::from_static(b"worker")),
            ..Default::default()
        };
        let header = ContentHeader::basic(1024, properties);
        let mut dst = BytesMut::new();
        header.encode(&mut dst).unwrap();
        let decoded = ContentHeader::decode(&dst.freeze()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn continuation_flag_is_rejected() {
        let header = ContentHeader::basic(0, BasicProperties::default());
        let mut dst = BytesMut::new();
        header.encode(&mut dst).unwrap();
        let flag_at = dst.len() - 1;
        dst[flag_at] |= 1;
        assert!(matches!(
            ContentHeader::decode(&dst.freeze()),
            Err(Error::BadWireData(_))
        ));
    }
}
