//! API Gateway（REST, Lambda プロキシ統合）向けの ToDo ハンドラー
//!
//! 各エンドポイントは `src/bin/` の個別バイナリとしてデプロイされ、
//! ここにある共通のリクエスト解析・レスポンス生成を使う。

pub mod handlers;
pub mod request;
pub mod response;
pub mod state;

pub use request::*;
pub use response::*;
pub use state::*;
