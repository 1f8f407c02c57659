pub mod calc;
pub mod checkrole;
pub mod efficiency;
pub mod help;
pub mod purge;
pub mod roomid;
pub mod taki;
