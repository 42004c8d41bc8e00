use crate::models::{Bet, Contract};

/// Running totals of one user's trading on one contract.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settlement {
    /// Money put in through purchases.
    pub total_invested: f64,
    /// Money taken out through sales.
    pub sale_value: f64,
    /// Money taken out through redemptions.
    pub redeemed: f64,
    /// Shares paid out on the winning side.
    pub payout: f64,
}

impl Settlement {
    pub fn profit(&self) -> f64 {
        self.payout + self.sale_value + self.redeemed - self.total_invested
    }
}

/// Payout of a single bet. Zero when the contract has no winning outcome yet.
pub fn payout(bet: &Bet, winning_outcome: Option<&str>) -> f64 {
    match winning_outcome {
        Some(winner) if bet.outcome == winner => bet.shares,
        _ => 0.0,
    }
}

/// Accumulate the settlement totals for a group of bets.
/// Order of the bets does not matter.
pub fn settle<'a, I>(contract: &Contract, bets: I) -> Settlement
where
    I: IntoIterator<Item = &'a Bet>,
{
    let winner = contract.winning_outcome();

    bets.into_iter().fold(Settlement::default(), |mut acc, bet| {
        let amount = bet.amount as f64;
        if bet.is_redemption {
            acc.redeemed -= amount;
        } else if bet.amount > 0 {
            acc.total_invested += amount;
        } else {
            acc.sale_value -= amount;
        }
        acc.payout += payout(bet, winner);
        acc
    })
}

/// Realized profit of one user on one contract.
pub fn compute_net_profit<'a, I>(contract: &Contract, bets: I) -> f64
where
    I: IntoIterator<Item = &'a Bet>,
{
    settle(contract, bets).profit()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_contract(resolved: Option<&str>) -> Contract {
        Contract {
            id: "c1".into(),
            creator_id: "creator".into(),
            outcome_type: "BINARY".into(),
            is_resolved: resolved.is_some(),
            resolution: resolved.map(String::from),
            resolution_time: resolved.map(|_| 2_000),
            created_time: 0,
            close_time: None,
            group_slugs: Vec::new(),
        }
    }

    fn make_bet(amount: i64, outcome: &str, shares: f64, is_redemption: bool) -> Bet {
        Bet {
            user_id: "u1".into(),
            contract_id: "c1".into(),
            amount,
            outcome: outcome.into(),
            shares,
            created_time: 1_000,
            is_redemption,
        }
    }

    #[test]
    fn test_winning_purchase_breaks_even() {
        let contract = make_contract(Some("YES"));
        let bets = vec![make_bet(10, "YES", 10.0, false)];
        assert_eq!(compute_net_profit(&contract, &bets), 0.0);
    }

    #[test]
    fn test_losing_purchase_loses_stake() {
        let contract = make_contract(Some("NO"));
        let bets = vec![make_bet(10, "YES", 25.0, false)];
        assert_eq!(compute_net_profit(&contract, &bets), -10.0);
    }

    #[test]
    fn test_full_redemption_on_unresolved_contract() {
        let contract = make_contract(None);
        let bets = vec![
            make_bet(10, "YES", 10.0, false),
            make_bet(-10, "NO", 10.0, true),
        ];
        let s = settle(&contract, &bets);
        assert_eq!(s.total_invested, 10.0);
        assert_eq!(s.redeemed, 10.0);
        assert_eq!(s.sale_value, 0.0);
        assert_eq!(s.profit(), 0.0);
    }

    #[test]
    fn test_sale_credits_proceeds() {
        let contract = make_contract(None);
        let bets = vec![
            make_bet(50, "YES", 80.0, false),
            make_bet(-65, "YES", -80.0, false),
        ];
        assert_eq!(compute_net_profit(&contract, &bets), 15.0);
    }

    #[test]
    fn test_unresolved_contract_pays_nothing() {
        let mut contract = make_contract(Some("YES"));
        contract.is_resolved = false;

        for outcome in ["YES", "NO"] {
            let bet = make_bet(10, outcome, 30.0, false);
            assert_eq!(payout(&bet, contract.winning_outcome()), 0.0);
        }
        let bets = vec![make_bet(10, "YES", 30.0, false)];
        assert_eq!(compute_net_profit(&contract, &bets), -10.0);
    }

    #[test]
    fn test_order_independent() {
        let contract = make_contract(Some("YES"));
        let mut bets = vec![
            make_bet(20, "YES", 35.0, false),
            make_bet(15, "NO", 22.0, false),
            make_bet(-12, "NO", -22.0, false),
            make_bet(-5, "YES", -5.0, true),
            make_bet(7, "YES", 9.5, false),
        ];
        let forward = compute_net_profit(&contract, &bets);
        bets.reverse();
        let backward = compute_net_profit(&contract, &bets);
        bets.rotate_left(2);
        let rotated = compute_net_profit(&contract, &bets);

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
        // payout 35 - 5 + 9.5 = 39.5, sales 12, redeemed 5, invested 42
        assert_eq!(forward, 39.5 + 12.0 + 5.0 - 42.0);
    }

    #[test]
    fn test_empty_group_is_zero() {
        let contract = make_contract(Some("YES"));
        let bets: Vec<Bet> = Vec::new();
        assert_eq!(compute_net_profit(&contract, &bets), 0.0);
    }
}
