use sea_orm::prelude::Decimal;

use crate::entities::box_entity as boxes;

/// 旧命名规则中可兑换奖品编号的上限
pub const EXCHANGEABLE_MAX_NUMBER: i64 = 17;

/// 根据奖品名称判断是否可兑换现金（历史规则）
///
/// 名称按空白拆分，取第二段开头的整数（允许正负号），`<= 17` 视为可兑换。
/// 没有第二段或无法解析时视为不可兑换。新数据应直接设置 `items.is_exchangeable`。
pub fn is_exchangeable_name(name: &str) -> bool {
    let Some(token) = name.split_whitespace().nth(1) else {
        return false;
    };

    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return false;
    }

    // 负数一定不大于上限，超出 i64 范围也一样
    if negative {
        return true;
    }
    digits
        .parse::<i64>()
        .map(|n| n <= EXCHANGEABLE_MAX_NUMBER)
        .unwrap_or(false)
}

/// 盲盒当前的财务累计值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerState {
    pub total_revenue: Decimal,
    pub total_payout: Decimal,
    pub exchangeable_payout: Decimal,
    pub retained_profit_percentage: Decimal,
}

impl From<&boxes::Model> for LedgerState {
    fn from(m: &boxes::Model) -> Self {
        LedgerState {
            total_revenue: m.total_revenue,
            total_payout: m.total_payout,
            exchangeable_payout: m.exchangeable_payout,
            retained_profit_percentage: m.retained_profit_percentage,
        }
    }
}

/// 一次抽奖的结算结果
///
/// `*_delta` 为写入数据库的增量，其余为结算后的快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub revenue_delta: Decimal,
    pub payout_delta: Decimal,
    pub exchangeable_delta: Decimal,
    pub total_revenue: Decimal,
    pub total_payout: Decimal,
    pub exchangeable_payout: Decimal,
    pub retained_profit: Decimal,
    pub net_profit: Decimal,
}

/// 计算一次抽奖后的财务数据
pub fn settle(
    state: &LedgerState,
    box_price: Decimal,
    prize_value: Decimal,
    exchangeable: bool,
) -> Settlement {
    let revenue_delta = box_price;
    let payout_delta = prize_value;
    let exchangeable_delta = if exchangeable {
        prize_value
    } else {
        Decimal::ZERO
    };

    let total_revenue = state.total_revenue + revenue_delta;
    let total_payout = state.total_payout + payout_delta;
    let exchangeable_payout = state.exchangeable_payout + exchangeable_delta;
    let retained_profit = exchangeable_payout * state.retained_profit_percentage;
    let net_profit = total_revenue - total_payout + retained_profit;

    Settlement {
        revenue_delta,
        payout_delta,
        exchangeable_delta,
        total_revenue,
        total_payout,
        exchangeable_payout,
        retained_profit,
        net_profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn state() -> LedgerState {
        LedgerState {
            total_revenue: dec("1000"),
            total_payout: dec("400"),
            exchangeable_payout: dec("300"),
            retained_profit_percentage: dec("0.1"),
        }
    }

    #[test]
    fn test_settle_exchangeable_prize() {
        let s = settle(&state(), dec("50"), dec("75"), true);
        assert_eq!(s.total_revenue, dec("1050"));
        assert_eq!(s.total_payout, dec("475"));
        assert_eq!(s.exchangeable_payout, dec("375"));
        assert_eq!(s.retained_profit, dec("37.5"));
        assert_eq!(s.net_profit, dec("612.5"));
        assert_eq!(s.revenue_delta, dec("50"));
        assert_eq!(s.payout_delta, dec("75"));
        assert_eq!(s.exchangeable_delta, dec("75"));
    }

    #[test]
    fn test_settle_non_exchangeable_prize() {
        let s = settle(&state(), dec("50"), dec("75"), false);
        assert_eq!(s.exchangeable_payout, dec("300"));
        assert_eq!(s.exchangeable_delta, Decimal::ZERO);
        assert_eq!(s.retained_profit, dec("30"));
        // 1050 - 475 + 30
        assert_eq!(s.net_profit, dec("605"));
    }

    #[test]
    fn test_settle_zero_value_prize() {
        let empty = LedgerState {
            total_revenue: Decimal::ZERO,
            total_payout: Decimal::ZERO,
            exchangeable_payout: Decimal::ZERO,
            retained_profit_percentage: dec("0.25"),
        };
        let s = settle(&empty, dec("50"), Decimal::ZERO, true);
        assert_eq!(s.total_revenue, dec("50"));
        assert_eq!(s.total_payout, Decimal::ZERO);
        assert_eq!(s.net_profit, dec("50"));
    }

    #[test]
    fn test_exchangeable_name_rule() {
        assert!(is_exchangeable_name("Prize 17"));
        assert!(is_exchangeable_name("Prize 1"));
        assert!(!is_exchangeable_name("Prize 18"));
        assert!(!is_exchangeable_name("Mystery"));
        assert!(!is_exchangeable_name("Mystery Box"));
        assert!(!is_exchangeable_name(""));
    }

    #[test]
    fn test_exchangeable_name_parsing_edges() {
        // 多个空白视为一个分隔
        assert!(is_exchangeable_name("  Prize   12  "));
        // 取第二段的前导整数
        assert!(is_exchangeable_name("Prize 17kg Gold"));
        assert!(!is_exchangeable_name("Prize 170"));
        assert!(is_exchangeable_name("Prize -3"));
        assert!(!is_exchangeable_name("Prize kg17"));
        assert!(!is_exchangeable_name("Prize -"));
        assert!(!is_exchangeable_name("Prize +x"));
        assert!(is_exchangeable_name("Prize +17"));
    }

    #[test]
    fn test_exchangeable_name_out_of_range_numbers() {
        // 超出 i64 的负数仍然 <= 17
        assert!(is_exchangeable_name("Prize -99999999999999999999"));
        assert!(is_exchangeable_name("Prize -00000000000000000000000001"));
        assert!(!is_exchangeable_name("Prize 99999999999999999999"));
        assert!(is_exchangeable_name("Prize 000000000000000000000000017"));
    }
}
