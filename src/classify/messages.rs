//! Human-readable wording per category, tuned to the contract action.

use crate::classify::catalog::ErrorCategory;
use crate::pipeline::call::ContractAction;

/// Shown when the raw message is too long to be useful.
pub const GENERIC_MESSAGE: &str = "Operation failed. Please try again.";

/// Default wording for `category` when the caller was attempting `action`.
pub fn default_message(category: ErrorCategory, action: ContractAction) -> String {
    use ContractAction as A;
    use ErrorCategory::*;

    let text = match (category, action) {
        (InsufficientBalance, A::Repay) => "You don't have enough balance to repay this amount.",
        (InsufficientBalance, A::Withdraw) => "You don't have enough supplied balance to withdraw this amount.",
        (InsufficientBalance, _) => {
            return format!("Insufficient balance to {} this amount.", action.verb());
        }

        (InsufficientCollateral, A::Borrow) => {
            "Not enough collateral to borrow this amount. Deposit more collateral first."
        }
        (InsufficientCollateral, A::WithdrawCollateral) => "You don't have that much collateral to withdraw.",
        (InsufficientCollateral, A::Liquidate) => "The borrower does not have enough collateral to seize.",
        (InsufficientCollateral, _) => "Insufficient collateral for this operation.",

        (InsufficientLiquidity, A::Borrow) => "The pool does not have enough liquidity to borrow this amount.",
        (InsufficientLiquidity, A::Withdraw) => {
            "The pool does not have enough liquidity to withdraw this amount right now."
        }
        (InsufficientLiquidity, _) => "Insufficient pool liquidity.",

        (LimitExceeded, A::Borrow) => "This borrow exceeds your borrowing limit (LTV).",
        (LimitExceeded, _) => "This amount exceeds the allowed limit.",

        (UnsafePosition, A::WithdrawCollateral) => "Withdrawing this much collateral would make your position unhealthy.",
        (UnsafePosition, A::Borrow) => "Borrowing this much would make your position unhealthy.",
        (UnsafePosition, _) => "This would make your position unhealthy.",

        (PositionHealthy, _) => "This position is healthy and cannot be liquidated.",
        (Unauthorized, _) => "You are not authorized to perform this action.",
        (NotInitialized, _) => "The contract has not been initialized.",
        (UserRejected, _) => "Transaction was rejected in your wallet.",
        (WalletLocked, _) => "Your wallet is locked. Unlock it and try again.",
        (NetworkError, _) => "Network error. Check your connection and try again.",
        (SimulationFailed, _) => "Transaction simulation failed.",
        (Timeout, _) => "The request timed out. Please try again.",
        (Unknown, _) => GENERIC_MESSAGE,
        (AccountNotFound, _) => "Account not found. Fund the account before sending transactions.",
        (RestoreRequired, _) => "Some contract state has expired and must be restored before this operation.",
        (StaleSequence, _) => "Another transaction from this account was submitted first. Please try again.",
        (InvalidAmount, _) => "Please enter a valid, positive amount.",

        (AssetNotSupported, A::Borrow) => "This asset cannot be borrowed.",
        (AssetNotSupported, A::DepositCollateral) => "This asset cannot be used as collateral.",
        (AssetNotSupported, _) => "This asset is not supported.",

        (NoDebt, A::Repay) => "You have no outstanding debt to repay.",
        (NoDebt, A::Liquidate) => "This borrower has no debt in the selected asset.",
        (NoDebt, _) => "There is no outstanding debt.",

        (OracleUnavailable, _) => "Price data is unavailable or stale. Please try again shortly.",
    };
    text.to_string()
}
