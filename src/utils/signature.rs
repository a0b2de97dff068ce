use sha1::{Digest, Sha1};

/// 计算接入校验签名
///
/// 将 token、timestamp、nonce 按字典序排序后直接拼接，取 SHA-1 的小写十六进制。
pub fn compute_signature(token: &str, timestamp: &str, nonce: &str) -> String {
    let mut parts = [token, timestamp, nonce];
    parts.sort_unstable();

    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// 校验请求确实来自微信服务器
pub fn verify_signature(token: &str, timestamp: &str, nonce: &str, signature: &str) -> bool {
    compute_signature(token, timestamp, nonce) == signature
}
