//! Token ABI bindings shared by every flow

use alloy_sol_types::sol;

sol! {
    /// ERC-20 surface used for display and allowance checks
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }

    /// Deposit bookkeeping on contracts that accept ERC-223 transfers
    interface IERC223Depository {
        function depositedTokens(address user, address token) external view returns (uint256);
    }
}
