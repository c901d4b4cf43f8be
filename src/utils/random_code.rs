use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成指定长度的随机大写字母数字串
pub fn generate_random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_charset() {
        let code = generate_random_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.bytes().all(|b| CHARSET.contains(&b)));
        assert!(generate_random_code(0).is_empty());
    }
}
