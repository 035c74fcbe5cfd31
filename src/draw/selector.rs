use sea_orm::prelude::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::RandomSource;
use crate::entities::item_entity as items;
use crate::error::{AppError, AppResult};

/// 参与抽奖的候选奖品
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    /// 未归一化的权重
    pub weight: f64,
}

impl From<&items::Model> for Candidate {
    fn from(m: &items::Model) -> Self {
        Candidate {
            id: m.id,
            name: m.name.clone(),
            price: m.price,
            weight: m.percentage,
        }
    }
}

/// 抽中的奖品
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPrize {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "crate::utils::money::serialize_as_number")]
    #[schema(value_type = f64, example = 75)]
    pub price: Decimal,
    /// 该奖品在累计分布中的上界（便于审计）
    pub threshold: f64,
}

/// 按权重抽取一个奖品
///
/// 按传入顺序累加权重，取 `r = u * total`，返回第一个满足 `r < cumulative[i]`
/// 的奖品。权重为 0 的奖品累计值与前一项相同，永远不会被选中。
pub fn select_prize(candidates: &[Candidate], random: &dyn RandomSource) -> AppResult<SelectedPrize> {
    if candidates.is_empty() {
        return Err(AppError::InvalidState("No prize items to draw from".into()));
    }

    if let Some(bad) = candidates
        .iter()
        .find(|c| !c.weight.is_finite() || c.weight < 0.0)
    {
        return Err(AppError::InvalidState(format!(
            "Item {} has an invalid weight {}",
            bad.id, bad.weight
        )));
    }

    let mut cumulative = 0.0;
    let thresholds: Vec<f64> = candidates
        .iter()
        .map(|c| {
            cumulative += c.weight;
            cumulative
        })
        .collect();
    let total_weight = cumulative;

    if total_weight <= 0.0 {
        return Err(AppError::InvalidState(
            "Total prize weight must be positive".into(),
        ));
    }

    let r = random.next_uniform() * total_weight;

    let index = thresholds
        .iter()
        .position(|&threshold| r < threshold)
        // 浮点舍入可能使 r == total，退回最后一个正权重奖品
        .or_else(|| candidates.iter().rposition(|c| c.weight > 0.0))
        .ok_or_else(|| AppError::InvalidState("Total prize weight must be positive".into()))?;

    let chosen = &candidates[index];
    Ok(SelectedPrize {
        id: chosen.id,
        name: chosen.name.clone(),
        price: chosen.price,
        threshold: thresholds[index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{FixedSequence, SeededRandom};
    use std::collections::HashMap;

    fn candidate(id: i64, weight: f64) -> Candidate {
        Candidate {
            id,
            name: format!("Prize {id}"),
            price: Decimal::from(id * 10),
            weight,
        }
    }

    #[test]
    fn test_fixed_draws_are_deterministic() {
        let list = vec![candidate(1, 10.0), candidate(2, 30.0), candidate(3, 60.0)];
        // total = 100, thresholds = 10 / 40 / 100
        let source = FixedSequence::new(vec![0.05, 0.1, 0.39, 0.4, 0.99]);
        let picks: Vec<i64> = (0..5)
            .map(|_| select_prize(&list, &source).unwrap().id)
            .collect();
        assert_eq!(picks, vec![1, 2, 2, 3, 3]);

        let again = FixedSequence::new(vec![0.05, 0.1, 0.39, 0.4, 0.99]);
        let repeat: Vec<i64> = (0..5)
            .map(|_| select_prize(&list, &again).unwrap().id)
            .collect();
        assert_eq!(picks, repeat);
    }

    #[test]
    fn test_threshold_and_passthrough() {
        let list = vec![candidate(1, 2.5), candidate(2, 7.5)];
        let prize = select_prize(&list, &FixedSequence::new(vec![0.5])).unwrap();
        assert_eq!(prize.id, 2);
        assert_eq!(prize.name, "Prize 2");
        assert_eq!(prize.price, Decimal::from(20));
        assert_eq!(prize.threshold, 10.0);
    }

    #[test]
    fn test_zero_weight_is_unreachable() {
        let list = vec![
            candidate(1, 0.0),
            candidate(2, 5.0),
            candidate(3, 0.0),
            candidate(4, 5.0),
            candidate(5, 0.0),
        ];
        let draws: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let source = FixedSequence::new(draws);
        for _ in 0..1000 {
            let id = select_prize(&list, &source).unwrap().id;
            assert!(id == 2 || id == 4, "selected zero-weight item {id}");
        }
    }

    #[test]
    fn test_draw_at_upper_edge_falls_back_to_last_positive_weight() {
        let list = vec![candidate(1, 1.0), candidate(2, 1.0), candidate(3, 0.0)];
        let prize = select_prize(&list, &FixedSequence::new(vec![1.0])).unwrap();
        assert_eq!(prize.id, 2);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let err = select_prize(&[], &FixedSequence::new(vec![0.5])).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_zero_total_weight_is_rejected() {
        let list = vec![candidate(1, 0.0), candidate(2, 0.0)];
        let err = select_prize(&list, &FixedSequence::new(vec![0.5])).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_negative_or_nan_weight_is_rejected() {
        let list = vec![candidate(1, 5.0), candidate(2, -1.0)];
        let err = select_prize(&list, &FixedSequence::new(vec![0.5])).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let list = vec![candidate(1, f64::NAN)];
        let err = select_prize(&list, &FixedSequence::new(vec![0.5])).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_frequencies_match_weights() {
        let list = vec![
            candidate(1, 45.0),
            candidate(2, 8.0),
            candidate(3, 0.5),
            candidate(4, 12.0),
            candidate(5, 34.5),
        ];
        let total: f64 = list.iter().map(|c| c.weight).sum();
        let trials = 100_000;
        let source = SeededRandom::new(20250901);

        let mut counts: HashMap<i64, u32> = HashMap::new();
        for _ in 0..trials {
            let id = select_prize(&list, &source).unwrap().id;
            *counts.entry(id).or_default() += 1;
        }

        for c in &list {
            let p = c.weight / total;
            let observed = *counts.get(&c.id).unwrap_or(&0) as f64 / trials as f64;
            // 5 个标准差的容差
            let tolerance = 5.0 * (p * (1.0 - p) / trials as f64).sqrt();
            assert!(
                (observed - p).abs() <= tolerance,
                "item {} expected {p:.4}, observed {observed:.4}",
                c.id
            );
        }
    }
}
