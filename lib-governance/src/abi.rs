//! Multisig contract ABI

use alloy_sol_types::sol;

sol! {
    interface IMultisig {
        event TransactionProposed(uint256 indexed txId, address indexed proposer, uint256 timestamp);

        function proposeTx(address to, uint256 value, bytes data) external returns (uint256);
        function approveTx(uint256 txId) external;
        function declineTx(uint256 txId) external;
        function executeTx(uint256 txId) external;

        function addOwner(address owner) external;
        function removeOwner(address owner) external;
        function changeThreshold(uint256 threshold) external;
        function changeDelay(uint256 delay) external;

        function txAllowed(uint256 txId) external view returns (bool);
        function isOwner(address account) external view returns (bool);
        function numOwners() external view returns (uint256);
        function votePassThreshold() external view returns (uint256);
        function executionDelay() external view returns (uint256);
        function numTxs() external view returns (uint256);
        function getTx(uint256 txId) external view returns (
            address to,
            uint256 value,
            bytes data,
            uint256 proposedTimestamp,
            bool executed,
            uint256 numApprovals,
            uint256 numVotes,
            uint256 requiredApprovals
        );
    }
}
