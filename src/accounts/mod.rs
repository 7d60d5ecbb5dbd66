mod active;
pub use active::ActiveAccountStore;

mod fetcher;
pub use fetcher::UserAccountFetcher;

mod store;
pub use store::UserAccountsStore;

mod user_account;
pub use user_account::{
    Badges, NostrWalletConnect, ProfileSnapshot, RelaySetting, UserAccount, UserContacts,
    UserStats, WalletPreference,
};
