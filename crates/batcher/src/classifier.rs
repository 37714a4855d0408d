//! Cost classification of transaction kinds.
//!
//! Each kind maps to a [`CostCategory`] that bounds how many calls of that
//! kind may share one transaction. Unknown kinds are treated as
//! [`CostCategory::High`] so that they end up in the smallest batches.

use std::fmt;

use courier_primitives::TransactionKind;

/// How expensive a kind of call is to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CostCategory {
    /// Randomness, combat and other step-heavy operations.
    High,
    /// Ordinary state writes and transfers.
    Medium,
    /// Flag flips, naming and configuration.
    Low,
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Medium => f.write_str("MEDIUM"),
            Self::Low => f.write_str("LOW"),
        }
    }
}

/// Maximum number of calls per transaction for each category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryLimits {
    /// Limit for [`CostCategory::High`].
    pub high: usize,
    /// Limit for [`CostCategory::Medium`].
    pub medium: usize,
    /// Limit for [`CostCategory::Low`].
    pub low: usize,
}

impl Default for CategoryLimits {
    fn default() -> Self {
        Self { high: 6, medium: 5, low: 10 }
    }
}

impl CategoryLimits {
    /// Returns the limit for `category`.
    pub const fn batch_limit(&self, category: CostCategory) -> usize {
        match category {
            CostCategory::High => self.high,
            CostCategory::Medium => self.medium,
            CostCategory::Low => self.low,
        }
    }

    /// Returns the limit for calls of `kind`.
    pub const fn batch_limit_for(&self, kind: Option<TransactionKind>) -> usize {
        self.batch_limit(classify(kind))
    }
}

/// Returns the cost category of `kind`. Absent and unmapped kinds are
/// [`CostCategory::High`].
pub const fn classify(kind: Option<TransactionKind>) -> CostCategory {
    let Some(kind) = kind else {
        return CostCategory::High;
    };

    match kind {
        TransactionKind::TravelHex | TransactionKind::ExplorerCreate
        | TransactionKind::ExplorerAdd | TransactionKind::ExplorerDelete
        | TransactionKind::ExplorerMove | TransactionKind::ExplorerExplorerSwap
        | TransactionKind::ExplorerGuardSwap | TransactionKind::GuardExplorerSwap
        | TransactionKind::GuardAdd | TransactionKind::GuardDelete
        | TransactionKind::TroopTroopAdjacentTransfer
        | TransactionKind::TroopStructureAdjacentTransfer
        | TransactionKind::StructureTroopAdjacentTransfer | TransactionKind::TroopBurn
        | TransactionKind::ArmyCreate | TransactionKind::ArmyDelete
        | TransactionKind::ArmyBuyTroops | TransactionKind::ArmyMergeTroops
        | TransactionKind::CreateBuilding | TransactionKind::DestroyBuilding
        | TransactionKind::LevelUp | TransactionKind::Destroy | TransactionKind::UpgradeLevel
        | TransactionKind::Send | TransactionKind::Pickup | TransactionKind::ArrivalsOffload
        | TransactionKind::BurnResourceForResourceProduction
        | TransactionKind::BurnLaborForResourceProduction
        | TransactionKind::BurnResourceForLaborProduction
        | TransactionKind::MintStartingResources | TransactionKind::Mint
        | TransactionKind::MintTestLords | TransactionKind::OpenAccount
        | TransactionKind::CreateBanks | TransactionKind::Buy | TransactionKind::Sell
        | TransactionKind::Add | TransactionKind::Remove | TransactionKind::Deposit
        | TransactionKind::Withdraw | TransactionKind::CreateOrder
        | TransactionKind::AcceptOrder | TransactionKind::AcceptPartialOrder
        | TransactionKind::CancelOrder | TransactionKind::Create | TransactionKind::Accept
        | TransactionKind::Cancel | TransactionKind::Edit
        | TransactionKind::CreateMarketplaceOrders | TransactionKind::AcceptMarketplaceOrder
        | TransactionKind::CancelMarketplaceOrder | TransactionKind::EditMarketplaceOrder
        | TransactionKind::CreateGuild | TransactionKind::JoinGuild => CostCategory::Medium,

        TransactionKind::PauseBuildingProduction | TransactionKind::ResumeBuildingProduction
        | TransactionKind::PauseProduction | TransactionKind::ResumeProduction
        | TransactionKind::SetEntityName | TransactionKind::SetAddressName
        | TransactionKind::LeaveGuild | TransactionKind::RemoveMember
        | TransactionKind::UpdateWhitelist | TransactionKind::RemoveGuildMember
        | TransactionKind::RemovePlayerFromWhitelist | TransactionKind::TransferGuildOwnership
        | TransactionKind::WhitelistPlayer | TransactionKind::TransferStructureOwnership
        | TransactionKind::TransferAgentOwnership | TransactionKind::StructureBurn
        | TransactionKind::UpdateConstructionAccess | TransactionKind::ClaimConstructionPoints
        | TransactionKind::ClaimSharePoints | TransactionKind::AllocateShares
        | TransactionKind::ClaimWonderProductionBonus
        | TransactionKind::ContributeToConstruction | TransactionKind::AttachLords
        | TransactionKind::DetachLords | TransactionKind::Approve
        | TransactionKind::SetApprovalForAll | TransactionKind::SetCoOwners
        | TransactionKind::SetAccess | TransactionKind::AssignRealmPositions
        | TransactionKind::ObtainEntryToken | TransactionKind::TokenLock
        | TransactionKind::StartQuest | TransactionKind::ClaimReward | TransactionKind::AddGame
        | TransactionKind::GameCount | TransactionKind::GetGameCount
        | TransactionKind::DisableQuests | TransactionKind::EnableQuests
        | TransactionKind::SeasonPrizeClaim | TransactionKind::ClaimLeaderboardRewards
        | TransactionKind::RegisterToLeaderboard | TransactionKind::BlitzPrizePlayerRank
        | TransactionKind::ChangeOwnerAmmFee | TransactionKind::ChangeOwnerBridgeFee
        | TransactionKind::Initialize | TransactionKind::GrantRole
        | TransactionKind::SetStartingResourcesConfig | TransactionKind::SetMapConfig
        | TransactionKind::SetVillageFoundResourcesConfig
        | TransactionKind::SetVictoryPointsGrantConfig
        | TransactionKind::SetVictoryPointsWinConfig | TransactionKind::SetGameModeConfig
        | TransactionKind::SetBlitzPreviousGame | TransactionKind::SetTravelFoodCostConfig
        | TransactionKind::SetSeasonConfig | TransactionKind::SetVrfConfig
        | TransactionKind::SetResourceBridgeFeeSplitConfig | TransactionKind::SetAgentConfig
        | TransactionKind::SetVillageTokenConfig | TransactionKind::SetCapacityConfig
        | TransactionKind::SetDonkeySpeedConfig | TransactionKind::SetResourceWeightConfig
        | TransactionKind::SetTradeConfig | TransactionKind::SetTickConfig
        | TransactionKind::SetResourceFactoryConfig | TransactionKind::SetBankConfig
        | TransactionKind::SetResourceBridgeWhitelistConfig | TransactionKind::SetTroopConfig
        | TransactionKind::SetBattleConfig | TransactionKind::SetStructureLevelConfig
        | TransactionKind::SetWorldConfig | TransactionKind::SetMercenariesNameConfig
        | TransactionKind::SetStructureMaxLevelConfig | TransactionKind::SetBuildingConfig
        | TransactionKind::SetBuildingCategoryConfig | TransactionKind::SetHyperstructureConfig
        | TransactionKind::SetStaminaConfig | TransactionKind::SetStaminaRefillConfig
        | TransactionKind::SetSettlementConfig | TransactionKind::SetBlitzRegistrationConfig
        | TransactionKind::SetQuestConfig => CostCategory::Low,

        TransactionKind::Explore | TransactionKind::ExplorerExtractReward
        | TransactionKind::AttackExplorerVsExplorer | TransactionKind::AttackExplorerVsGuard
        | TransactionKind::AttackGuardVsExplorer | TransactionKind::RaidExplorerVsGuard
        | TransactionKind::BattleStart | TransactionKind::BattleResolve
        | TransactionKind::BattleForceStart | TransactionKind::BattleJoin
        | TransactionKind::BattleLeave | TransactionKind::BattleClaim
        | TransactionKind::RequestRandom | TransactionKind::OpenChest
        | TransactionKind::ApplyRelic | TransactionKind::Contribute
        | TransactionKind::MakeHyperstructures | TransactionKind::SettleRealms
        | TransactionKind::Register | TransactionKind::SeasonClose | TransactionKind::EndGame
        | TransactionKind::BlitzPrizeClaim | TransactionKind::BlitzPrizeClaimNoGame => CostCategory::High,

        _ => CostCategory::High,
    }
}
