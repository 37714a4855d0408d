//! Logical transaction kinds.

macro_rules! transaction_kinds {
    ($($variant:ident => $entrypoint:literal,)+) => {
        /// The logical game operation a call performs.
        ///
        /// Kinds are identified by the entrypoint name of the call that carries them.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[allow(missing_docs)]
        pub enum TransactionKind {
            $($variant,)+
        }

        impl TransactionKind {
            /// Every known kind.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Returns the entrypoint name that identifies this kind.
            pub const fn entrypoint(self) -> &'static str {
                match self {
                    $(Self::$variant => $entrypoint,)+
                }
            }

            /// Looks up the kind for an entrypoint name, ignoring ASCII case.
            pub fn from_entrypoint(entrypoint: &str) -> Option<Self> {
                let name = entrypoint.to_ascii_lowercase();
                match name.as_str() {
                    $($entrypoint => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

transaction_kinds! {
    // Randomness, combat and other step-heavy operations.
    Explore => "explore",
    ExplorerExtractReward => "explorer_extract_reward",
    AttackExplorerVsExplorer => "attack_explorer_vs_explorer",
    AttackExplorerVsGuard => "attack_explorer_vs_guard",
    AttackGuardVsExplorer => "attack_guard_vs_explorer",
    RaidExplorerVsGuard => "raid_explorer_vs_guard",
    BattleStart => "battle_start",
    BattleResolve => "battle_resolve",
    BattleForceStart => "battle_force_start",
    BattleJoin => "battle_join",
    BattleLeave => "battle_leave",
    BattleClaim => "battle_claim",
    RequestRandom => "request_random",
    OpenChest => "open_chest",
    ApplyRelic => "apply_relic",
    Contribute => "contribute",
    MakeHyperstructures => "make_hyperstructures",
    SettleRealms => "settle_realms",
    Register => "register",
    SeasonClose => "season_close",
    EndGame => "end_game",
    BlitzPrizeClaim => "blitz_prize_claim",
    BlitzPrizeClaimNoGame => "blitz_prize_claim_no_game",
    // State writes and transfers.
    TravelHex => "travel_hex",
    ExplorerCreate => "explorer_create",
    ExplorerAdd => "explorer_add",
    ExplorerDelete => "explorer_delete",
    ExplorerMove => "explorer_move",
    ExplorerExplorerSwap => "explorer_explorer_swap",
    ExplorerGuardSwap => "explorer_guard_swap",
    GuardExplorerSwap => "guard_explorer_swap",
    GuardAdd => "guard_add",
    GuardDelete => "guard_delete",
    TroopTroopAdjacentTransfer => "troop_troop_adjacent_transfer",
    TroopStructureAdjacentTransfer => "troop_structure_adjacent_transfer",
    StructureTroopAdjacentTransfer => "structure_troop_adjacent_transfer",
    TroopBurn => "troop_burn",
    ArmyCreate => "army_create",
    ArmyDelete => "army_delete",
    ArmyBuyTroops => "army_buy_troops",
    ArmyMergeTroops => "army_merge_troops",
    CreateBuilding => "create_building",
    DestroyBuilding => "destroy_building",
    LevelUp => "level_up",
    Destroy => "destroy",
    UpgradeLevel => "upgrade_level",
    Send => "send",
    Pickup => "pickup",
    ArrivalsOffload => "arrivals_offload",
    BurnResourceForResourceProduction => "burn_resource_for_resource_production",
    BurnLaborForResourceProduction => "burn_labor_for_resource_production",
    BurnResourceForLaborProduction => "burn_resource_for_labor_production",
    MintStartingResources => "mint_starting_resources",
    Mint => "mint",
    MintTestLords => "mint_test_lords",
    OpenAccount => "open_account",
    CreateBanks => "create_banks",
    Buy => "buy",
    Sell => "sell",
    Add => "add",
    Remove => "remove",
    Deposit => "deposit",
    Withdraw => "withdraw",
    CreateOrder => "create_order",
    AcceptOrder => "accept_order",
    AcceptPartialOrder => "accept_partial_order",
    CancelOrder => "cancel_order",
    Create => "create",
    Accept => "accept",
    Cancel => "cancel",
    Edit => "edit",
    CreateMarketplaceOrders => "create_marketplace_orders",
    AcceptMarketplaceOrder => "accept_marketplace_order",
    CancelMarketplaceOrder => "cancel_marketplace_order",
    EditMarketplaceOrder => "edit_marketplace_order",
    CreateGuild => "create_guild",
    JoinGuild => "join_guild",
    // Simple state changes and configuration.
    PauseBuildingProduction => "pause_building_production",
    ResumeBuildingProduction => "resume_building_production",
    PauseProduction => "pause_production",
    ResumeProduction => "resume_production",
    SetEntityName => "set_entity_name",
    SetAddressName => "set_address_name",
    LeaveGuild => "leave_guild",
    RemoveMember => "remove_member",
    UpdateWhitelist => "update_whitelist",
    RemoveGuildMember => "remove_guild_member",
    RemovePlayerFromWhitelist => "remove_player_from_whitelist",
    TransferGuildOwnership => "transfer_guild_ownership",
    WhitelistPlayer => "whitelist_player",
    TransferStructureOwnership => "transfer_structure_ownership",
    TransferAgentOwnership => "transfer_agent_ownership",
    StructureBurn => "structure_burn",
    UpdateConstructionAccess => "update_construction_access",
    ClaimConstructionPoints => "claim_construction_points",
    ClaimSharePoints => "claim_share_points",
    AllocateShares => "allocate_shares",
    ClaimWonderProductionBonus => "claim_wonder_production_bonus",
    ContributeToConstruction => "contribute_to_construction",
    AttachLords => "attach_lords",
    DetachLords => "detach_lords",
    Approve => "approve",
    SetApprovalForAll => "set_approval_for_all",
    SetCoOwners => "set_co_owners",
    SetAccess => "set_access",
    AssignRealmPositions => "assign_realm_positions",
    ObtainEntryToken => "obtain_entry_token",
    TokenLock => "token_lock",
    StartQuest => "start_quest",
    ClaimReward => "claim_reward",
    AddGame => "add_game",
    GameCount => "game_count",
    GetGameCount => "get_game_count",
    DisableQuests => "disable_quests",
    EnableQuests => "enable_quests",
    SeasonPrizeClaim => "season_prize_claim",
    ClaimLeaderboardRewards => "claim_leaderboard_rewards",
    RegisterToLeaderboard => "register_to_leaderboard",
    BlitzPrizePlayerRank => "blitz_prize_player_rank",
    ChangeOwnerAmmFee => "change_owner_amm_fee",
    ChangeOwnerBridgeFee => "change_owner_bridge_fee",
    Initialize => "initialize",
    GrantRole => "grant_role",
    SetStartingResourcesConfig => "set_starting_resources_config",
    SetMapConfig => "set_map_config",
    SetVillageFoundResourcesConfig => "set_village_found_resources_config",
    SetVictoryPointsGrantConfig => "set_victory_points_grant_config",
    SetVictoryPointsWinConfig => "set_victory_points_win_config",
    SetGameModeConfig => "set_game_mode_config",
    SetBlitzPreviousGame => "set_blitz_previous_game",
    SetTravelFoodCostConfig => "set_travel_food_cost_config",
    SetSeasonConfig => "set_season_config",
    SetVrfConfig => "set_vrf_config",
    SetResourceBridgeFeeSplitConfig => "set_resource_bridge_fee_split_config",
    SetAgentConfig => "set_agent_config",
    SetVillageTokenConfig => "set_village_token_config",
    SetCapacityConfig => "set_capacity_config",
    SetDonkeySpeedConfig => "set_donkey_speed_config",
    SetResourceWeightConfig => "set_resource_weight_config",
    SetTradeConfig => "set_trade_config",
    SetTickConfig => "set_tick_config",
    SetResourceFactoryConfig => "set_resource_factory_config",
    SetBankConfig => "set_bank_config",
    SetResourceBridgeWhitelistConfig => "set_resource_bridge_whitelist_config",
    SetTroopConfig => "set_troop_config",
    SetBattleConfig => "set_battle_config",
    SetStructureLevelConfig => "set_structure_level_config",
    SetWorldConfig => "set_world_config",
    SetMercenariesNameConfig => "set_mercenaries_name_config",
    SetStructureMaxLevelConfig => "set_structure_max_level_config",
    SetBuildingConfig => "set_building_config",
    SetBuildingCategoryConfig => "set_building_category_config",
    SetHyperstructureConfig => "set_hyperstructure_config",
    SetStaminaConfig => "set_stamina_config",
    SetStaminaRefillConfig => "set_stamina_refill_config",
    SetSettlementConfig => "set_settlement_config",
    SetBlitzRegistrationConfig => "set_blitz_registration_config",
    SetQuestConfig => "set_quest_config",
    // Recognised but not classified.
    SetWonderBonusConfig => "set_wonder_bonus_config",
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entrypoint())
    }
}
