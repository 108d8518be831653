// アダプター層
// ドメイン層のポートに対する具体的な実装を提供する

pub mod driven;
