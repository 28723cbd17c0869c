//! Feed token codec
//!
//! Turns small integer lists into short opaque URL-safe tokens and back.
//! Tokens are derived deterministically from a secret salt, so the same
//! index always yields the same token for the life of the process.
//!
//! Layout before base64url: `tag(4) || keystream XOR body`, where body is
//! `count || (len || minimal big-endian bytes)* || zero padding` and tag is
//! a truncated HMAC-SHA256 over the body. The keystream is derived from the
//! tag, so neighbouring indices produce unrelated-looking tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::RegistryError;

type HmacSha256 = Hmac<Sha256>;

const TAG_LEN: usize = 4;

/// Upper bound for the configured minimum token length
pub const MAX_MIN_LENGTH: usize = 64;

#[derive(Clone)]
pub struct FeedTokenCodec {
    mac: HmacSha256,
    min_length: usize,
}

impl FeedTokenCodec {
    pub fn new(salt: &str, min_length: usize) -> Result<Self, RegistryError> {
        if salt.is_empty() {
            return Err(RegistryError::CodecSetup("salt must not be empty".to_string()));
        }
        if min_length > MAX_MIN_LENGTH {
            return Err(RegistryError::CodecSetup(format!(
                "minimum length {} exceeds {}",
                min_length, MAX_MIN_LENGTH
            )));
        }

        let mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|e| RegistryError::CodecSetup(e.to_string()))?;

        Ok(Self { mac, min_length })
    }

    pub fn encode(&self, values: &[u64]) -> Result<String, RegistryError> {
        let count = u8::try_from(values.len())
            .map_err(|_| RegistryError::CodecSetup("too many values for one token".to_string()))?;

        let mut body = vec![count];
        for value in values {
            let bytes = value.to_be_bytes();
            let skip = bytes.iter().take_while(|b| **b == 0).count();
            body.push((bytes.len() - skip) as u8);
            body.extend_from_slice(&bytes[skip..]);
        }

        // base64 without padding turns n bytes into ceil(4n / 3) characters
        let min_bytes = (self.min_length * 3).div_ceil(4);
        if TAG_LEN + body.len() < min_bytes {
            body.resize(min_bytes - TAG_LEN, 0);
        }

        let tag = self.tag(&body);
        let mut raw = tag.to_vec();
        raw.extend(
            body.iter()
                .zip(self.keystream(&tag, body.len()))
                .map(|(b, k)| b ^ k),
        );

        Ok(URL_SAFE_NO_PAD.encode(raw))
    }

    pub fn decode(&self, token: &str) -> Result<Vec<u64>, RegistryError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| RegistryError::InvalidToken)?;
        if raw.len() <= TAG_LEN {
            return Err(RegistryError::InvalidToken);
        }

        let (tag, sealed) = raw.split_at(TAG_LEN);
        let body: Vec<u8> = sealed
            .iter()
            .zip(self.keystream(tag, sealed.len()))
            .map(|(b, k)| b ^ k)
            .collect();

        let mut mac = self.mac.clone();
        mac.update(b"tag");
        mac.update(&body);
        mac.verify_truncated_left(tag)
            .map_err(|_| RegistryError::InvalidToken)?;

        parse_body(&body)
    }

    fn tag(&self, body: &[u8]) -> [u8; TAG_LEN] {
        let mut mac = self.mac.clone();
        mac.update(b"tag");
        mac.update(body);
        let digest = mac.finalize().into_bytes();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&digest[..TAG_LEN]);
        tag
    }

    fn keystream(&self, tag: &[u8], len: usize) -> Vec<u8> {
        let mut stream = Vec::with_capacity(len);
        let mut block: u32 = 0;
        while stream.len() < len {
            let mut mac = self.mac.clone();
            mac.update(b"stream");
            mac.update(tag);
            mac.update(&block.to_be_bytes());
            stream.extend_from_slice(&mac.finalize().into_bytes());
            block += 1;
        }
        stream.truncate(len);
        stream
    }
}

fn parse_body(body: &[u8]) -> Result<Vec<u64>, RegistryError> {
    let (&count, mut rest) = body.split_first().ok_or(RegistryError::InvalidToken)?;

    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (&len, tail) = rest.split_first().ok_or(RegistryError::InvalidToken)?;
        let len = len as usize;
        if len > 8 || tail.len() < len {
            return Err(RegistryError::InvalidToken);
        }

        let (digits, tail) = tail.split_at(len);
        // Only minimal encodings are canonical
        if digits.first() == Some(&0) {
            return Err(RegistryError::InvalidToken);
        }

        let mut bytes = [0u8; 8];
        bytes[8 - len..].copy_from_slice(digits);
        values.push(u64::from_be_bytes(bytes));
        rest = tail;
    }

    if rest.iter().any(|b| *b != 0) {
        return Err(RegistryError::InvalidToken);
    }

    Ok(values)
}
