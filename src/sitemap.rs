//! The console's page map.

use crate::{
    access::AccessLevel,
    error::RouteTableError,
    route::{RouteDefinition, RouteTable},
    view::ViewRegistry,
};

pub const NOT_FOUND_VIEW: &str = "NotFoundPage";

/// Views of the console. Pages reached from the landing screen ship with the shell;
/// the rest are split into their own chunks.
pub fn console_views() -> ViewRegistry {
    ViewRegistry::new()
        .eager("NewHomePage", "NewHomePage")
        .eager("HomePage", "HomePage")
        .eager("MyAppsPage", "MyAppsPage")
        .eager("UserLoginPage", "UserLoginPage")
        .eager("UserRegisterPage", "UserRegisterPage")
        .eager("UserManagePage", "UserManagePage")
        .lazy_chunk("AboutView", "AboutView", "pages/AboutView.js")
        .lazy_chunk("AppChatPage", "AppChatPage", "pages/AppChatPage.js")
        .lazy_chunk("AppEditPage", "AppEditPage", "pages/AppEditPage.js")
        .lazy_chunk("AppManagePage", "AppManagePage", "pages/admin/AppManagePage.js")
        .lazy_chunk("ChatManagePage", "ChatManagePage", "pages/admin/ChatManagePage.js")
        .lazy_chunk("NoAuthPage", "NoAuthPage", "pages/noAuth.js")
        .lazy_chunk(NOT_FOUND_VIEW, "NotFoundPage", "pages/NotFoundPage.js")
}

pub fn console_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new("/about", "about", "AboutView"),
        RouteDefinition::new("/", "主页", "NewHomePage"),
        RouteDefinition::new("/generate", "应用生成", "HomePage"),
        RouteDefinition::new("/my-apps", "我的应用", "MyAppsPage"),
        RouteDefinition::new("/user/login", "用户登录", "UserLoginPage"),
        RouteDefinition::new("/user/register", "用户注册", "UserRegisterPage"),
        RouteDefinition::new("/admin/userManage", "用户管理", "UserManagePage")
            .access(AccessLevel::Admin),
        RouteDefinition::new("/app/chat/:id", "应用对话", "AppChatPage"),
        RouteDefinition::new("/app/edit/:id", "编辑应用", "AppEditPage"),
        RouteDefinition::new("/admin/appManage", "应用查询", "AppManagePage")
            .access(AccessLevel::Admin),
        RouteDefinition::new("/admin/chatManage", "对话管理", "ChatManagePage")
            .access(AccessLevel::Admin),
        RouteDefinition::new("/noAuth", "无权限", "NoAuthPage"),
    ]
}

/// Builds the validated console table mounted under `base_path`.
pub fn console_table(base_path: &str) -> Result<RouteTable, RouteTableError> {
    RouteTable::build(console_routes(), NOT_FOUND_VIEW, console_views())
        .map(|table| table.with_base_path(base_path))
}
