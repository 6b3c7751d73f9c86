//! Solidity interfaces of the guardian and its staking tokens.

use alloy_sol_types::sol;

sol! {
    /// Guardian staking contract (MasterChef layout)
    #[derive(Debug, PartialEq, Eq)]
    interface IGuardian {
        function poolLength() external view returns (uint256);
        function poolInfo(uint256 pid) external view returns (
            address token,
            uint256 allocPoint,
            uint256 lastRewardBlock,
            uint256 rewardPerToken
        );
        function userInfo(uint256 pid, address user) external view returns (uint256 amount, uint256 rewardDebt);
        function pendingReward(uint256 pid, address user) external view returns (uint256);
        function BONUS_MULTIPLIER() external view returns (uint256);
        function stake(uint256 pid, uint256 amount) external;
        function unstake(uint256 pid, uint256 amount) external;
        function autoCompound() external;
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
