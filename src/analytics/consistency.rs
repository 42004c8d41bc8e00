use crate::models::Bet;
use crate::store::ContractIndex;

/// A bet timestamped before the contract it was placed on was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketAgeAnomaly {
    pub user_id: String,
    pub contract_id: String,
    pub bet_time: i64,
    pub contract_created_time: i64,
}

/// Every bet that would produce a negative market age.
/// Bets on contracts missing from the index are not checked.
pub fn find_market_age_anomalies<'a, I>(bets: I, contracts: &ContractIndex) -> Vec<MarketAgeAnomaly>
where
    I: IntoIterator<Item = &'a Bet>,
{
    bets.into_iter()
        .filter_map(|bet| {
            let contract = contracts.get(&bet.contract_id)?;
            (bet.created_time < contract.created_time).then(|| MarketAgeAnomaly {
                user_id: bet.user_id.clone(),
                contract_id: bet.contract_id.clone(),
                bet_time: bet.created_time,
                contract_created_time: contract.created_time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contract;

    fn make_contract(id: &str, created_time: i64) -> Contract {
        Contract {
            id: id.into(),
            creator_id: "creator".into(),
            outcome_type: "BINARY".into(),
            is_resolved: false,
            resolution: None,
            resolution_time: None,
            created_time,
            close_time: None,
            group_slugs: Vec::new(),
        }
    }

    fn make_bet(contract_id: &str, created_time: i64) -> Bet {
        Bet {
            user_id: "u1".into(),
            contract_id: contract_id.into(),
            amount: 5,
            outcome: "NO".into(),
            shares: 9.0,
            created_time,
            is_redemption: false,
        }
    }

    #[test]
    fn test_detects_bet_before_creation() {
        let contracts = ContractIndex::new(vec![make_contract("m1", 1_000), make_contract("m2", 5_000)]);
        let bets = vec![
            make_bet("m1", 1_000),
            make_bet("m2", 4_999),
            make_bet("m2", 6_000),
            make_bet("unknown", 0),
        ];

        let anomalies = find_market_age_anomalies(&bets, &contracts);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].contract_id, "m2");
        assert_eq!(anomalies[0].bet_time, 4_999);
    }

    #[test]
    fn test_clean_data_has_no_anomalies() {
        let contracts = ContractIndex::new(vec![make_contract("m1", 1_000)]);
        let bets = vec![make_bet("m1", 2_000)];
        assert!(find_market_age_anomalies(&bets, &contracts).is_empty());
    }
}
