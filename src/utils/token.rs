use rand::Rng;

/// 生成 32 字节随机数的十六进制字符串（64 个字符），用于邮箱验证
pub fn generate_verification_token() -> String {
    let mut rng = rand::thread_rng();
    (0..32).map(|_| format!("{:02x}", rng.r#gen::<u8>())).collect()
}
