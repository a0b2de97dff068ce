pub mod dispatcher;
pub mod menu;
pub mod token;

// 重新导出常用类型
pub use dispatcher::{Dispatcher, Handler, HandlerKind, ReplySink};
pub use menu::MenuService;
pub use token::AccessTokenProvider;
