//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`upload`] - 图片上传/托管接口
//! - [`categories`] - 分类管理接口
//! - [`menus`] - 菜单管理接口 (含库存操作和顾客端菜单)
//! - [`options`] - 菜单选项接口
//! - [`orders`] - 订单接口 (下单、队列、状态流转)
//! - [`content`] - 引导页/轮播图接口

pub mod auth;
pub mod health;
pub mod upload;

// Catalog APIs
pub mod categories;
pub mod menus;
pub mod options;

// Orders
pub mod orders;

// Storefront content
pub mod content;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
