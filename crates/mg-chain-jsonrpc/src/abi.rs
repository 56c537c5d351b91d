//! ABI of the collection contract, limited to what the minting front-end calls.

use alloy_sol_types::sol;

sol! {
    interface IMintCollection {
        function maxSupply() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function maxMintAmountPerTx() external view returns (uint256);
        function cost() external view returns (uint256);
        function paused() external view returns (bool);
        function whitelistMintEnabled() external view returns (bool);
        function mint(uint256 _mintAmount) external payable;
        function whitelistMint(uint256 _mintAmount, bytes32[] calldata _merkleProof) external payable;
    }
}
