use alloy::sol;

// Interface of the swap hook as seen by the agent.
sol! {
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ISwapHook {
        event SwapIntent(
            bytes32 indexed swapId,
            address indexed owner,
            address indexed tokenIn,
            address tokenOut,
            uint256 amountIn
        );

        function completeSwap(bytes32 swapId, bool betterPriceFound) external;
    }
}
