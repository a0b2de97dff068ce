use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// 一级菜单最多按钮数
pub const MAX_TOP_LEVEL_BUTTONS: usize = 3;
/// 二级菜单最多按钮数
pub const MAX_SUB_BUTTONS: usize = 5;

/// 菜单按钮动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    Click,
    View,
    ScancodePush,
    #[serde(rename = "scancode_waitmsg")]
    ScancodeWaitMsg,
    #[serde(rename = "pic_sysphoto")]
    PicSysPhoto,
    #[serde(rename = "pic_photo_or_album")]
    PicPhotoOrAlbum,
    #[serde(rename = "pic_weixin")]
    PicWeixin,
    LocationSelect,
    MediaId,
    ViewLimited,
    #[serde(rename = "miniprogram")]
    MiniProgram,
}

/// 功能按钮（叶子按钮）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionButton {
    pub name: String,
    #[serde(rename = "type")]
    pub button_type: ButtonType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_id: String,
    #[serde(default, rename = "appid", skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, rename = "pagepath", skip_serializing_if = "String::is_empty")]
    pub page_path: String,
}

impl FunctionButton {
    pub fn new(name: impl Into<String>, button_type: ButtonType) -> Self {
        Self {
            name: name.into(),
            button_type,
            key: String::new(),
            url: String::new(),
            media_id: String::new(),
            app_id: String::new(),
            page_path: String::new(),
        }
    }

    /// 点击类按钮，用户点击后推送带 key 的 CLICK 事件
    pub fn click(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::new(name, ButtonType::Click)
        }
    }

    /// 跳转网页按钮
    pub fn view(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::new(name, ButtonType::View)
        }
    }
}

/// 一级按钮，点击后弹出二级菜单
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelButton {
    pub name: String,
    #[serde(rename = "sub_button")]
    sub_buttons: Vec<FunctionButton>,
}

impl LevelButton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_buttons: Vec::new(),
        }
    }

    /// 添加二级按钮，超过上限时失败且不修改菜单
    pub fn add_function_button(&mut self, button: FunctionButton) -> Result<()> {
        if self.sub_buttons.len() >= MAX_SUB_BUTTONS {
            return Err(AppError::Validation(format!(
                "level button '{}' already has {} sub buttons",
                self.name, MAX_SUB_BUTTONS
            )));
        }
        self.sub_buttons.push(button);
        Ok(())
    }

    pub fn sub_buttons(&self) -> &[FunctionButton] {
        &self.sub_buttons
    }
}

/// 一级菜单中的按钮
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MenuButton {
    Function(FunctionButton),
    Level(LevelButton),
}

/// 自定义菜单
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Menu {
    #[serde(rename = "button")]
    buttons: Vec<MenuButton>,
}

/// 菜单JSON中的按钮定义，功能按钮与一级按钮共用
#[derive(Debug, Deserialize)]
struct ButtonDefinition {
    name: String,
    #[serde(rename = "type")]
    button_type: Option<ButtonType>,
    #[serde(default)]
    key: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    media_id: String,
    #[serde(default, rename = "appid")]
    app_id: String,
    #[serde(default, rename = "pagepath")]
    page_path: String,
    sub_button: Option<Vec<FunctionButton>>,
}

#[derive(Debug, Deserialize)]
struct MenuDefinition {
    button: Vec<ButtonDefinition>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一级功能按钮
    pub fn add_function_button(&mut self, button: FunctionButton) -> Result<()> {
        self.ensure_capacity()?;
        self.buttons.push(MenuButton::Function(button));
        Ok(())
    }

    /// 添加带二级菜单的一级按钮，二级菜单不能为空
    pub fn add_level_button(&mut self, button: LevelButton) -> Result<()> {
        if button.sub_buttons.is_empty() {
            return Err(AppError::Validation(format!(
                "level button '{}' has no sub buttons",
                button.name
            )));
        }
        self.ensure_capacity()?;
        self.buttons.push(MenuButton::Level(button));
        Ok(())
    }

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.buttons.len() >= MAX_TOP_LEVEL_BUTTONS {
            return Err(AppError::Validation(format!(
                "menu already has {} top-level buttons",
                MAX_TOP_LEVEL_BUTTONS
            )));
        }
        Ok(())
    }

    /// 从微信菜单JSON构建菜单，按钮数量限制同样生效
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: MenuDefinition = serde_json::from_str(json)?;
        let mut menu = Menu::new();

        for button in definition.button {
            match button.sub_button {
                Some(subs) => {
                    let mut level = LevelButton::new(button.name);
                    for sub in subs {
                        level.add_function_button(sub)?;
                    }
                    menu.add_level_button(level)?;
                }
                None => {
                    let button_type = button.button_type.ok_or_else(|| {
                        AppError::Validation(format!("button '{}' has no type", button.name))
                    })?;
                    menu.add_function_button(FunctionButton {
                        name: button.name,
                        button_type,
                        key: button.key,
                        url: button.url,
                        media_id: button.media_id,
                        app_id: button.app_id,
                        page_path: button.page_path,
                    })?;
                }
            }
        }

        Ok(menu)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
