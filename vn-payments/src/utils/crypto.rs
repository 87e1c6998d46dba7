use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// 签名摘要算法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    // HMAC-SHA256，密钥为十六进制解码后的字节，结果大写
    HmacSha256Hex,
    // MD5(密钥 + 待签名串)，结果小写
    Md5Concat,
}

impl DigestAlgorithm {
    pub fn digest(&self, canonical: &str, secret: &str) -> String {
        match self {
            Self::HmacSha256Hex => {
                hmac_sha256(&pack_hex(secret), canonical.as_bytes()).to_uppercase()
            }
            Self::Md5Concat => md5_hex(format!("{secret}{canonical}").as_bytes()),
        }
    }
}

// HMAC-SHA256 签名
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> String {
    // HMAC 接受任意长度的密钥
    match HmacSha256::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(message);
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    }
}

// MD5 摘要
pub fn md5_hex(input: &[u8]) -> String {
    format!("{:x}", md5::compute(input))
}

// 十六进制密钥解码，遇到第一个非法字符对即停止，奇数长度的尾部半字节被丢弃
pub fn pack_hex(secret: &str) -> Vec<u8> {
    let bytes = secret.as_bytes();
    let valid_pairs = bytes
        .chunks_exact(2)
        .take_while(|pair| pair.iter().all(u8::is_ascii_hexdigit))
        .count();

    hex::decode(&bytes[..valid_pairs * 2]).unwrap_or_default()
}

// 签名比较，忽略大小写
pub fn signatures_match(expected: &str, received: &str) -> bool {
    if expected.is_empty() || expected.len() != received.len() {
        return false;
    }

    expected
        .bytes()
        .zip(received.bytes())
        .fold(0u8, |acc, (a, b)| {
            acc | (a.to_ascii_uppercase() ^ b.to_ascii_uppercase())
        })
        == 0
}
