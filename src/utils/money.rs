use sea_orm::prelude::Decimal;
use serde::Serializer;

/// 以 JSON 数字输出金额（抽奖接口的客户端按数字读取）
pub fn serialize_as_number<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number: f64 = value
        .normalize()
        .to_string()
        .parse()
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_f64(number)
}
