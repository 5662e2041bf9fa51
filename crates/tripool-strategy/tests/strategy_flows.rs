use tripool_core::constants::{N_COINS, PRECISION};
use tripool_core::{Address, LedgerState, StrategyError, SupportedAsset};
use tripool_strategy::memory::{
    MemoryBook, MemoryCustody, MemoryGauge, MemoryPool, GAUGE_ADDRESS, SHARE_TOKEN,
};
use tripool_strategy::{AssetCustody, NoStaking, Pool, StakingSink, Strategy, StrategySettings};

const DAI: Address = Address([0xd1; 20]);
const USDC: Address = Address([0xc1; 20]);
const USDT: Address = Address([0x71; 20]);
const STRATEGY: Address = Address([0x5a; 20]);
const VAULT: Address = Address([0x7a; 20]);
const LP: Address = Address([0x1f; 20]);
const RECIPIENT: Address = Address([0xee; 20]);

const USDC_UNIT: u128 = 1_000_000;

fn coins() -> [SupportedAsset; N_COINS] {
    [
        SupportedAsset { address: DAI, decimals: 18, slot: 0 },
        SupportedAsset { address: USDC, decimals: 6, slot: 1 },
        SupportedAsset { address: USDT, decimals: 6, slot: 2 },
    ]
}

fn settings() -> StrategySettings {
    StrategySettings { vault: VAULT, assets: coins(), slippage_bps: 100 }
}

/// Pool holding 3_060_000 units of value behind 3_000_000 shares (virtual price 1.02)
fn seeded_pool(book: &MemoryBook) -> MemoryPool {
    let mut pool = MemoryPool::new(book.clone(), coins(), STRATEGY);
    pool.seed_liquidity(
        &LP,
        [1_020_000 * PRECISION, 1_020_000 * USDC_UNIT, 1_020_000 * USDC_UNIT],
        3_000_000 * PRECISION,
    );
    pool
}

type GaugeStrategy = Strategy<MemoryPool, MemoryGauge, MemoryCustody>;

fn gauge_strategy(book: &MemoryBook, pool: MemoryPool) -> GaugeStrategy {
    let gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    let custody = MemoryCustody::new(book.clone(), STRATEGY);
    Strategy::new(settings(), pool, gauge, custody).unwrap()
}

/// Delegates to a [`MemoryPool`] but pays `bonus` extra coin on every single-coin exit
struct GenerousPool {
    inner: MemoryPool,
    book: MemoryBook,
    bonus: u128,
}

impl Pool for GenerousPool {
    fn add_liquidity(&mut self, amounts: [u128; N_COINS], min_shares: u128) -> tripool_core::Result<u128> {
        self.inner.add_liquidity(amounts, min_shares)
    }

    fn remove_liquidity_one_coin(&mut self, shares: u128, slot: usize, min_out: u128) -> tripool_core::Result<u128> {
        let out = self.inner.remove_liquidity_one_coin(shares, slot, min_out)?;
        self.book.mint(&self.inner.coin_at(slot)?, &STRATEGY, self.bonus);
        Ok(out + self.bonus)
    }

    fn remove_liquidity(&mut self, shares: u128, min_amounts: [u128; N_COINS]) -> tripool_core::Result<[u128; N_COINS]> {
        self.inner.remove_liquidity(shares, min_amounts)
    }

    fn calc_withdraw_one_coin(&self, shares: u128, slot: usize) -> tripool_core::Result<u128> {
        self.inner.calc_withdraw_one_coin(shares, slot)
    }

    fn virtual_price(&self) -> tripool_core::Result<u128> {
        self.inner.virtual_price()
    }

    fn reserve_balance(&self, slot: usize) -> tripool_core::Result<u128> {
        self.inner.reserve_balance(slot)
    }

    fn coin_at(&self, slot: usize) -> tripool_core::Result<Address> {
        self.inner.coin_at(slot)
    }

    fn share_total_supply(&self) -> tripool_core::Result<u128> {
        self.inner.share_total_supply()
    }

    fn local_share_balance(&self) -> tripool_core::Result<u128> {
        self.inner.local_share_balance()
    }
}

/// Custody whose transfers to any `blocked` account are refused
struct BlockingCustody {
    inner: MemoryCustody,
    blocked: Vec<Address>,
}

impl AssetCustody for BlockingCustody {
    fn balance_of(&self, asset: &Address) -> tripool_core::Result<u128> {
        self.inner.balance_of(asset)
    }

    fn pull_from(&mut self, asset: &Address, owner: &Address, amount: u128) -> tripool_core::Result<()> {
        self.inner.pull_from(asset, owner, amount)
    }

    fn push_to(&mut self, asset: &Address, recipient: &Address, amount: u128) -> tripool_core::Result<()> {
        if self.blocked.contains(recipient) {
            return Err(StrategyError::Custody(format!("{recipient} is blocked")));
        }
        self.inner.push_to(asset, recipient, amount)
    }
}

/// Gauge that refuses bulk stakes
struct DownGauge {
    inner: MemoryGauge,
}

impl StakingSink for DownGauge {
    fn deposit_all_local_shares(&mut self) -> tripool_core::Result<u128> {
        Err(StrategyError::Staking("gauge is paused".to_string()))
    }

    fn deposit(&mut self, amount: u128) -> tripool_core::Result<()> {
        self.inner.deposit(amount)
    }

    fn withdraw(&mut self, amount: u128) -> tripool_core::Result<()> {
        self.inner.withdraw(amount)
    }

    fn staked_balance(&self) -> tripool_core::Result<u128> {
        self.inner.staked_balance()
    }
}

fn blocking_strategy(
    book: &MemoryBook,
    pool: MemoryPool,
    blocked: Vec<Address>,
) -> Strategy<MemoryPool, MemoryGauge, BlockingCustody> {
    let gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    let custody = BlockingCustody { inner: MemoryCustody::new(book.clone(), STRATEGY), blocked };
    Strategy::new(settings(), pool, gauge, custody).unwrap()
}

// ---------------------------------------------------------------------------
// construction
// ---------------------------------------------------------------------------

#[test]
fn construction_rejects_coin_order_mismatch() {
    let book = MemoryBook::new();
    let pool = seeded_pool(&book);
    let mut swapped = settings();
    swapped.assets[1].slot = 2;
    swapped.assets[2].slot = 1;

    let result = Strategy::new(
        swapped,
        pool,
        MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY),
        MemoryCustody::new(book.clone(), STRATEGY),
    );
    assert!(matches!(result, Err(StrategyError::InvalidConfiguration(_))));
}

#[test]
fn construction_rejects_unset_vault_and_wide_slippage() {
    let book = MemoryBook::new();

    let mut no_vault = settings();
    no_vault.vault = Address::ZERO;
    let result = Strategy::new(
        no_vault,
        seeded_pool(&book),
        NoStaking,
        MemoryCustody::new(book.clone(), STRATEGY),
    );
    assert!(matches!(result, Err(StrategyError::InvalidConfiguration(_))));

    let mut wide = settings();
    wide.slippage_bps = 10_000;
    let result = Strategy::new(
        wide,
        seeded_pool(&book),
        NoStaking,
        MemoryCustody::new(book.clone(), STRATEGY),
    );
    assert!(matches!(result, Err(StrategyError::InvalidConfiguration(_))));
}

#[test]
fn want_coins_lists_slots_in_order() {
    let book = MemoryBook::new();
    let strategy = gauge_strategy(&book, seeded_pool(&book));
    let wanted: Vec<Address> = strategy.want_coins().map(|c| c.address).collect();
    assert_eq!(wanted, vec![DAI, USDC, USDT]);
    assert!(strategy.supports_asset(&USDT));
    assert!(!strategy.supports_asset(&RECIPIENT));
}

// ---------------------------------------------------------------------------
// deposit
// ---------------------------------------------------------------------------

#[test]
fn deposit_mints_and_stakes_everything() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);

    let minted = strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    // 1_000e18 canonical at virtual price 1.02, no pool fee
    assert_eq!(minted, 980_392_156_862_745_098_039);
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(0, minted).unwrap());
    assert_eq!(book.balance(&USDC, &VAULT), 0);
    assert_eq!(book.balance(&USDC, &STRATEGY), 0);
    assert_eq!(book.balance(&SHARE_TOKEN, &GAUGE_ADDRESS), minted);
}

#[test]
fn deposit_rejects_unsupported_and_zero_amounts_without_moving_funds() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&USDC, &VAULT, 10 * USDC_UNIT);

    assert_eq!(
        strategy.deposit(&RECIPIENT, 10 * USDC_UNIT),
        Err(StrategyError::UnsupportedAsset(RECIPIENT))
    );
    assert_eq!(strategy.deposit(&USDC, 0), Err(StrategyError::NothingToDeposit));
    assert_eq!(book.balance(&USDC, &VAULT), 10 * USDC_UNIT);
    assert_eq!(strategy.ledger().unwrap().total(), 0);
}

#[test]
fn rejected_deposit_returns_pulled_coins_to_vault() {
    let book = MemoryBook::new();
    // 2% pool fee against a 1% slippage bound
    let pool = seeded_pool(&book).with_fee_bps(200);
    let mut strategy = gauge_strategy(&book, pool);
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);

    let result = strategy.deposit(&USDC, 1_000 * USDC_UNIT);

    assert!(matches!(result, Err(StrategyError::Pool(_))));
    assert_eq!(book.balance(&USDC, &VAULT), 1_000 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &STRATEGY), 0);
    assert_eq!(strategy.ledger().unwrap().total(), 0);
}

#[test]
fn deposit_all_uses_idle_balances() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&DAI, &STRATEGY, 51 * PRECISION);
    book.mint(&USDT, &STRATEGY, 51 * USDC_UNIT);

    let minted = strategy.deposit_all().unwrap();

    // 102 units of value at 1.02
    assert_eq!(minted, 100 * PRECISION);
    assert_eq!(book.balance(&DAI, &STRATEGY), 0);
    assert_eq!(book.balance(&USDT, &STRATEGY), 0);
    assert_eq!(strategy.ledger().unwrap().staked, 100 * PRECISION);
}

#[test]
fn deposit_all_with_nothing_idle_is_rejected() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    assert_eq!(strategy.deposit_all(), Err(StrategyError::NothingToDeposit));
}

#[test]
fn failed_stake_after_mint_reports_the_committed_shares() {
    let book = MemoryBook::new();
    let sink = DownGauge { inner: MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY) };
    let mut strategy = Strategy::new(
        settings(),
        seeded_pool(&book),
        sink,
        MemoryCustody::new(book.clone(), STRATEGY),
    )
    .unwrap();
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);

    let result = strategy.deposit(&USDC, 1_000 * USDC_UNIT);

    let minted = 980_392_156_862_745_098_039;
    assert!(matches!(
        result,
        Err(StrategyError::DepositUnstaked { shares_minted, .. }) if shares_minted == minted
    ));
    assert_eq!(book.balance(&USDC, &VAULT), 0);
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(minted, 0).unwrap());
}

// ---------------------------------------------------------------------------
// balance reporting
// ---------------------------------------------------------------------------

#[test]
fn check_balance_is_proportional_reserve_claim() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);
    strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    assert_eq!(strategy.check_balance(&USDC).unwrap(), 333_551_127);
    assert_eq!(strategy.check_balance(&DAI).unwrap(), 333_224_436_458_673_636_066);
    assert_eq!(
        strategy.check_balance(&RECIPIENT),
        Err(StrategyError::UnsupportedAsset(RECIPIENT))
    );
}

#[test]
fn check_balance_is_zero_for_an_empty_pool() {
    let book = MemoryBook::new();
    let pool = MemoryPool::new(book.clone(), coins(), STRATEGY);
    let strategy = gauge_strategy(&book, pool);
    assert_eq!(strategy.check_balance(&DAI), Ok(0));
}

// ---------------------------------------------------------------------------
// withdraw
// ---------------------------------------------------------------------------

#[test]
fn withdraw_releases_shortfall_from_stake_and_pays_recipient() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);
    let minted = strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    let paid = strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT).unwrap();

    // floor(minted * 500e6 / 999_999_999)
    let burned = 490_196_078_921_568_627_941;
    assert_eq!(paid, 500 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &RECIPIENT), 500 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &STRATEGY), 0);
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(0, minted - burned).unwrap());
}

#[test]
fn withdraw_forwards_surplus_to_vault() {
    let book = MemoryBook::new();
    let pool = GenerousPool { inner: seeded_pool(&book), book: book.clone(), bonus: 7 };
    let mut strategy = Strategy::new(
        settings(),
        pool,
        MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY),
        MemoryCustody::new(book.clone(), STRATEGY),
    )
    .unwrap();
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);
    strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    let paid = strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT).unwrap();

    assert_eq!(paid, 500 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &RECIPIENT), 500 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &VAULT), 7);
    assert_eq!(book.balance(&USDC, &STRATEGY), 0);
}

#[test]
fn withdraw_validates_before_touching_collaborators() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));

    assert_eq!(strategy.withdraw(&RECIPIENT, &USDC, 0), Err(StrategyError::InvalidAmount));
    assert_eq!(
        strategy.withdraw(&Address::ZERO, &USDC, 5),
        Err(StrategyError::InvalidRecipient)
    );
    assert_eq!(
        strategy.withdraw(&RECIPIENT, &RECIPIENT, 5),
        Err(StrategyError::UnsupportedAsset(RECIPIENT))
    );
    assert_eq!(strategy.withdraw(&RECIPIENT, &USDC, 5), Err(StrategyError::NoShares));
}

#[test]
fn rejected_redemption_restakes_released_shares() {
    let book = MemoryBook::new();
    // 5% exit fee pushes the single-coin payout under the 1% bound
    let mut pool = seeded_pool(&book).with_fee_bps(500);
    pool.seed_liquidity(&STRATEGY, [0; N_COINS], 1_000 * PRECISION);
    let mut gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    gauge.stake(1_000 * PRECISION).unwrap();
    let mut strategy =
        Strategy::new(settings(), pool, gauge, MemoryCustody::new(book.clone(), STRATEGY)).unwrap();

    let result = strategy.withdraw(&RECIPIENT, &USDC, 100 * USDC_UNIT);

    assert!(matches!(result, Err(StrategyError::Pool(_))));
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(0, 1_000 * PRECISION).unwrap());
    assert_eq!(book.balance(&USDC, &RECIPIENT), 0);
}

#[test]
fn faulty_sink_fails_withdrawal_instead_of_shrinking_it() {
    let book = MemoryBook::new();
    let mut pool = seeded_pool(&book);
    pool.seed_liquidity(&STRATEGY, [0; N_COINS], 1_000 * PRECISION);
    let mut gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    gauge.stake(1_000 * PRECISION).unwrap();
    gauge.set_release_haircut(1);
    let mut strategy =
        Strategy::new(settings(), pool, gauge, MemoryCustody::new(book.clone(), STRATEGY)).unwrap();

    let result = strategy.withdraw(&RECIPIENT, &USDC, 100 * USDC_UNIT);

    assert!(matches!(result, Err(StrategyError::InsufficientShares { .. })));
    assert_eq!(book.balance(&USDC, &RECIPIENT), 0);
}

#[test]
fn target_below_one_share_is_rejected_without_burning() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&DAI, &VAULT, 1_000 * PRECISION);
    strategy.deposit(&DAI, 1_000 * PRECISION).unwrap();
    let before = strategy.ledger().unwrap();

    // one wei of DAI is worth less than one share at virtual price 1.02
    assert_eq!(strategy.withdraw(&RECIPIENT, &DAI, 1), Err(StrategyError::InvalidAmount));
    assert_eq!(strategy.ledger().unwrap(), before);
    assert_eq!(book.balance(&DAI, &RECIPIENT), 0);
}

#[test]
fn refused_recipient_transfer_sends_proceeds_to_vault() {
    let book = MemoryBook::new();
    let mut strategy = blocking_strategy(&book, seeded_pool(&book), vec![RECIPIENT]);
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);
    let minted = strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    let result = strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT);

    let burned = 490_196_078_921_568_627_941;
    assert!(matches!(
        result,
        Err(StrategyError::WithdrawalUndelivered {
            shares_burned,
            received: 500_000_000,
            forwarded_to_vault: 500_000_000,
            ..
        }) if shares_burned == burned
    ));
    assert_eq!(book.balance(&USDC, &RECIPIENT), 0);
    assert_eq!(book.balance(&USDC, &VAULT), 500 * USDC_UNIT);
    assert_eq!(book.balance(&USDC, &STRATEGY), 0);
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(0, minted - burned).unwrap());
}

#[test]
fn undeliverable_proceeds_stay_with_strategy_and_are_reported() {
    let book = MemoryBook::new();
    let mut strategy = blocking_strategy(&book, seeded_pool(&book), vec![RECIPIENT, VAULT]);
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);
    strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();

    let result = strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT);

    assert!(matches!(
        result,
        Err(StrategyError::WithdrawalUndelivered { received: 500_000_000, forwarded_to_vault: 0, .. })
    ));
    assert_eq!(book.balance(&USDC, &STRATEGY), 500 * USDC_UNIT);
}

#[test]
fn rejected_redemption_leaves_prior_local_shares_local() {
    let book = MemoryBook::new();
    let mut pool = seeded_pool(&book).with_fee_bps(500);
    pool.seed_liquidity(&STRATEGY, [0; N_COINS], 1_000 * PRECISION);
    let mut gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    gauge.stake(800 * PRECISION).unwrap();
    let mut strategy =
        Strategy::new(settings(), pool, gauge, MemoryCustody::new(book.clone(), STRATEGY)).unwrap();

    // burn exceeds the 200 local shares, so part of it is released from stake first
    let result = strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT);

    assert!(matches!(result, Err(StrategyError::Pool(_))));
    assert_eq!(
        strategy.ledger().unwrap(),
        LedgerState::new(200 * PRECISION, 800 * PRECISION).unwrap()
    );
}

// ---------------------------------------------------------------------------
// withdraw-all
// ---------------------------------------------------------------------------

#[test]
fn withdraw_all_unstakes_everything_and_forwards_balances() {
    let book = MemoryBook::new();
    let mut pool = MemoryPool::new(book.clone(), coins(), STRATEGY);
    pool.seed_liquidity(
        &STRATEGY,
        [2_000 * PRECISION, 1_500 * USDC_UNIT, 1_500 * USDC_UNIT],
        5_000 * PRECISION,
    );
    let mut gauge = MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY);
    gauge.stake(5_000 * PRECISION).unwrap();
    let mut strategy =
        Strategy::new(settings(), pool, gauge, MemoryCustody::new(book.clone(), STRATEGY)).unwrap();
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(0, 5_000 * PRECISION).unwrap());

    let forwarded = strategy.withdraw_all().unwrap();

    assert_eq!(forwarded, [2_000 * PRECISION, 1_500 * USDC_UNIT, 1_500 * USDC_UNIT]);
    assert_eq!(book.balance(&DAI, &VAULT), 2_000 * PRECISION);
    assert_eq!(book.balance(&USDC, &VAULT), 1_500 * USDC_UNIT);
    assert_eq!(book.balance(&USDT, &VAULT), 1_500 * USDC_UNIT);
    assert_eq!(strategy.ledger().unwrap().total(), 0);
    assert_eq!(strategy.pool().share_total_supply().unwrap(), 0);
}

#[test]
fn withdraw_all_without_shares_still_sweeps_idle_coins() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    book.mint(&USDT, &STRATEGY, 3 * USDC_UNIT);

    let forwarded = strategy.withdraw_all().unwrap();

    assert_eq!(forwarded, [0, 0, 3 * USDC_UNIT]);
    assert_eq!(book.balance(&USDT, &VAULT), 3 * USDC_UNIT);
    assert_eq!(strategy.pool().share_total_supply().unwrap(), 3_000_000 * PRECISION);
}

#[test]
fn withdraw_all_reports_coins_it_could_not_forward() {
    let book = MemoryBook::new();
    let mut pool = MemoryPool::new(book.clone(), coins(), STRATEGY);
    pool.seed_liquidity(
        &STRATEGY,
        [2_000 * PRECISION, 1_500 * USDC_UNIT, 1_500 * USDC_UNIT],
        5_000 * PRECISION,
    );
    let mut strategy = blocking_strategy(&book, pool, vec![VAULT]);

    let result = strategy.withdraw_all();

    assert!(matches!(
        result,
        Err(StrategyError::ForwardIncomplete { shares_burned, stranded, .. })
            if shares_burned == 5_000 * PRECISION
                && stranded == [2_000 * PRECISION, 1_500 * USDC_UNIT, 1_500 * USDC_UNIT]
    ));
    assert_eq!(strategy.ledger().unwrap().total(), 0);
    assert_eq!(book.balance(&DAI, &STRATEGY), 2_000 * PRECISION);
}

// ---------------------------------------------------------------------------
// staking backends
// ---------------------------------------------------------------------------

#[test]
fn no_staking_backend_keeps_shares_local() {
    let book = MemoryBook::new();
    let mut strategy = Strategy::new(
        settings(),
        seeded_pool(&book),
        NoStaking,
        MemoryCustody::new(book.clone(), STRATEGY),
    )
    .unwrap();
    book.mint(&USDC, &VAULT, 1_000 * USDC_UNIT);

    let minted = strategy.deposit(&USDC, 1_000 * USDC_UNIT).unwrap();
    assert_eq!(strategy.ledger().unwrap(), LedgerState::new(minted, 0).unwrap());

    strategy.withdraw(&RECIPIENT, &USDC, 500 * USDC_UNIT).unwrap();
    assert_eq!(strategy.ledger().unwrap().staked, 0);
    assert_eq!(book.balance(&USDC, &RECIPIENT), 500 * USDC_UNIT);
}

#[test]
fn boxed_backend_is_selected_at_runtime() {
    let book = MemoryBook::new();
    for use_gauge in [true, false] {
        let sink: Box<dyn StakingSink> = if use_gauge {
            Box::new(MemoryGauge::new(book.clone(), SHARE_TOKEN, STRATEGY))
        } else {
            Box::new(NoStaking)
        };
        let pool = MemoryPool::new(book.clone(), coins(), STRATEGY);
        let mut strategy =
            Strategy::new(settings(), pool, sink, MemoryCustody::new(book.clone(), STRATEGY)).unwrap();
        book.mint(&DAI, &VAULT, 10 * PRECISION);

        let minted = strategy.deposit(&DAI, 10 * PRECISION).unwrap();
        let ledger = strategy.ledger().unwrap();
        assert_eq!(ledger.total(), minted);
        assert_eq!(ledger.staked == minted, use_gauge);

        strategy.withdraw_all().unwrap();
        assert_eq!(strategy.ledger().unwrap().total(), 0);
    }
}

// ---------------------------------------------------------------------------
// property: ledger never leaks shares
// ---------------------------------------------------------------------------

fn xorshift64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

fn rand_range(state: &mut u64, lo: u64, hi: u64) -> u64 {
    lo + xorshift64(state) % (hi - lo + 1)
}

#[test]
fn property_ledger_matches_share_token_balances() {
    let book = MemoryBook::new();
    let mut strategy = gauge_strategy(&book, seeded_pool(&book));
    let lp_shares = 3_000_000 * PRECISION;
    let assets = coins();
    let mut seed = 0x3b9a_ca07_d15e_a5e5u64;

    for _ in 0..300 {
        let coin = assets[rand_range(&mut seed, 0, 2) as usize];
        let unit = 10u128.pow(u32::from(coin.decimals));

        if xorshift64(&mut seed) % 3 != 0 {
            let amount = u128::from(rand_range(&mut seed, 1, 10_000)) * unit;
            book.mint(&coin.address, &VAULT, amount);
            strategy.deposit(&coin.address, amount).unwrap();
        } else {
            let value = strategy.check_balance(&coin.address).unwrap();
            if value < 2 {
                continue;
            }
            let amount = 1 + (u128::from(xorshift64(&mut seed)) % (value / 2));
            let paid = strategy.withdraw(&RECIPIENT, &coin.address, amount).unwrap();
            assert!(paid <= amount);
        }

        let ledger = strategy.ledger().unwrap();
        assert_eq!(ledger.local, 0);
        assert_eq!(ledger.local, book.balance(&SHARE_TOKEN, &STRATEGY));
        assert_eq!(ledger.staked, book.balance(&SHARE_TOKEN, &GAUGE_ADDRESS));
        assert_eq!(
            ledger.total() + lp_shares,
            strategy.pool().share_total_supply().unwrap()
        );
    }

    strategy.withdraw_all().unwrap();
    assert_eq!(strategy.ledger().unwrap().total(), 0);
    assert_eq!(strategy.pool().share_total_supply().unwrap(), lp_shares);
}
