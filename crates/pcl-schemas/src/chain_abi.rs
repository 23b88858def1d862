//! On-chain ABI surface, generated via `alloy::sol!`.
//!
//! Both pool contract variants implement the same logical interface under
//! different names and slightly different status encodings (see
//! `crate::pool`); the ERC-20 interface covers the stablecoin used for
//! premiums and collateral. This is the single crate that owns the ABI
//! surface — every other crate reaches the chain only through the bindings
//! generated here, the same role `mqk-schemas` plays for its internal DTOs.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface ILegacyInsurancePool {
        function createPool(
            string calldata productId,
            string calldata description,
            string calldata evidenceSourceUrl,
            uint256 coverageAmount,
            uint256 premiumRateBps,
            uint256 deadline
        ) external returns (uint256 poolId);

        function getRequiredPremium(uint256 poolId) external view returns (uint256 premium);

        function fundPremium(uint256 poolId, uint256 amount) external;

        function resolvePool(uint256 poolId, bool claimApproved) external;

        function cancelAndRefund(uint256 poolId) external;

        function emergencyResolve(uint256 poolId) external;

        // Not called by this agent (it never co-underwrites or withdraws its
        // own pools); encoded only so `pcl_chain::artifact_calls` can build
        // wallet-ready call objects for the collateral-provider/insured
        // counterparties the published artifacts target (spec §4.7).
        function joinPool(uint256 poolId, uint256 amount) external;
        function withdraw(uint256 poolId) external;

        function getPool(uint256 poolId) external view returns (
            uint8 status,
            uint256 coverageAmount,
            uint256 premiumAmount,
            uint256 deadline,
            address insured,
            bool claimApproved
        );

        function getPoolAccounting(uint256 poolId) external view returns (
            uint256 totalCollateral,
            uint256 premiumCollected,
            uint256 protocolFeeBps
        );

        function getPoolParticipants(uint256 poolId) external view returns (
            address insured,
            address[] memory collateralProviders
        );

        function nextPoolId() external view returns (uint256);

        function oracle() external view returns (address);

        event PoolCreated(uint256 indexed poolId, address indexed insured, uint256 coverageAmount);
        event PremiumFunded(uint256 indexed poolId, uint256 amount);
        event AgentJoined(uint256 indexed poolId, address indexed provider, uint256 amount);
        event PoolActivated(uint256 indexed poolId);
        event PoolResolved(uint256 indexed poolId, bool claimApproved);
        event PoolCancelled(uint256 indexed poolId);
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface ICurrentInsurancePool {
        function createAndFund(
            string calldata productId,
            string calldata description,
            string calldata evidenceSourceUrl,
            uint256 coverageAmount,
            uint256 premiumRateBps,
            uint256 deadline
        ) external returns (uint256 poolId);

        function resolvePool(uint256 poolId, bool claimApproved) external;

        function cancelAndRefund(uint256 poolId) external;

        function emergencyResolve(uint256 poolId) external;

        // See the matching note on `ILegacyInsurancePool`: never called by
        // this agent, encoded only for published-artifact call steps.
        function joinPool(uint256 poolId, uint256 amount) external;
        function withdraw(uint256 poolId) external;

        function getPool(uint256 poolId) external view returns (
            uint8 status,
            uint256 coverageAmount,
            uint256 premiumAmount,
            uint256 deadline,
            address insured,
            bool claimApproved
        );

        function getPoolAccounting(uint256 poolId) external view returns (
            uint256 totalCollateral,
            uint256 premiumCollected,
            uint256 protocolFeeBps
        );

        function getPoolParticipants(uint256 poolId) external view returns (
            address insured,
            address[] memory collateralProviders
        );

        function nextPoolId() external view returns (uint256);

        function oracle() external view returns (address);

        event PoolCreated(uint256 indexed poolId, address indexed insured, uint256 coverageAmount);
        event AgentJoined(uint256 indexed poolId, address indexed provider, uint256 amount);
        event PoolActivated(uint256 indexed poolId);
        event PoolResolved(uint256 indexed poolId, bool claimApproved);
        event PoolCancelled(uint256 indexed poolId);
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IErc20Stablecoin {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}
