use crate::config::{
    Config, ConvertSettings, Language, discover_presets, is_valid_preset_name, load_preset,
    remove_preset, save_preset, save_settings,
};
use crate::menu::handlers::run_converter;
use crate::tools::ToolPaths;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    tools: &ToolPaths,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_convert"),
        t!("main_menu.opt_settings"),
        t!("main_menu.opt_presets"),
        t!("main_menu.opt_language"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_converter(term, shutdown_signal, tools, config)?;
            Ok(true)
        }
        Some(1) => {
            show_convert_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) => {
            show_presets_menu(term, config)?;
            Ok(true)
        }
        Some(3) => {
            show_language_menu(term, config)?;
            Ok(true)
        }
        Some(4) => Ok(false),
        None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 轉換設定選單
///
/// 逐項編輯後立即存檔
fn show_convert_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());
        println!();

        let convert = &config.settings.convert;
        let items = vec![
            format!("{} [{}]", t!("settings.opt_width"), convert.width),
            format!("{} [{}]", t!("settings.opt_height"), convert.height),
            format!("{} [{}]", t!("settings.opt_framerate"), convert.framerate),
            format!("{} [{}]", t!("settings.opt_loops"), convert.loops),
            format!("{} [{}]", t!("settings.opt_hold"), convert.hold),
            format!("{} [{}]", t!("settings.opt_optimize"), convert.optimize),
            format!("{} [{}]", t!("settings.opt_key"), mask_key(&convert.tinify_key)),
            format!("{} [{}]", t!("settings.opt_output"), convert.output_path),
            t!("settings.back").to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        // ESC pressed - return without further changes
        let Some(selection) = selection else {
            return Ok(());
        };

        let convert = &mut config.settings.convert;
        match selection {
            0 => {
                convert.width = Input::<u32>::new()
                    .with_prompt(t!("settings.width_prompt").to_string())
                    .default(convert.width)
                    .interact_text()?;
            }
            1 => {
                convert.height = Input::<u32>::new()
                    .with_prompt(t!("settings.height_prompt").to_string())
                    .default(convert.height)
                    .interact_text()?;
            }
            2 => {
                convert.framerate = Input::<u32>::new()
                    .with_prompt(t!("settings.framerate_prompt").to_string())
                    .default(convert.framerate)
                    .interact_text()?;
            }
            3 => {
                convert.loops = Input::<u32>::new()
                    .with_prompt(t!("settings.loops_prompt").to_string())
                    .default(convert.loops)
                    .interact_text()?;
            }
            4 => {
                convert.hold = Input::<u64>::new()
                    .with_prompt(t!("settings.hold_prompt").to_string())
                    .default(convert.hold)
                    .interact_text()?;
            }
            5 => {
                convert.optimize = Confirm::new()
                    .with_prompt(t!("settings.optimize_prompt").to_string())
                    .default(convert.optimize)
                    .interact()?;
            }
            6 => {
                convert.tinify_key = Input::<String>::new()
                    .with_prompt(t!("settings.key_prompt").to_string())
                    .allow_empty(true)
                    .default(convert.tinify_key.clone())
                    .interact_text()?;
            }
            7 => {
                convert.output_path = Input::<String>::new()
                    .with_prompt(t!("settings.output_prompt").to_string())
                    .allow_empty(true)
                    .default(convert.output_path.clone())
                    .interact_text()?;
            }
            _ => return Ok(()),
        }

        save_settings(&config.settings)?;
        println!("\n{}", style(t!("settings.saved")).green());
    }
}

/// 預設集管理選單
fn show_presets_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("presets.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let presets = discover_presets()?;
        if presets.is_empty() {
            println!("\n{}", style(t!("presets.none")).dim());
        }
        println!();

        let mut items: Vec<String> = presets
            .iter()
            .map(|name| format!("{} {name}", t!("presets.load")))
            .collect();
        items.push(t!("presets.save_new").to_string());
        if !presets.is_empty() {
            items.push(t!("presets.remove").to_string());
        }
        items.push(t!("presets.back").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("presets.prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        let Some(selection) = selection else {
            return Ok(());
        };

        if selection < presets.len() {
            // 載入選定的預設集
            let name = &presets[selection];
            config.settings.convert = load_preset(name)?;
            config.settings.last_preset = Some(name.clone());
            save_settings(&config.settings)?;
            println!("\n{} {name}", style(t!("presets.loaded")).green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        } else if selection == presets.len() {
            save_new_preset(&config.settings.convert)?;
        } else if !presets.is_empty() && selection == presets.len() + 1 {
            remove_preset_interactive(term, &presets)?;
        } else {
            return Ok(());
        }
    }
}

/// 將目前的轉換設定另存為新預設集
fn save_new_preset(convert: &ConvertSettings) -> Result<()> {
    let name: String = Input::new()
        .with_prompt(t!("presets.name_prompt").to_string())
        .interact_text()?;
    let name = name.trim().to_string();

    if !is_valid_preset_name(&name) {
        println!("\n{}", style(t!("presets.invalid_name")).red());
        std::thread::sleep(std::time::Duration::from_secs(1));
        return Ok(());
    }

    save_preset(&name, convert)?;
    println!("\n{} {name}", style(t!("presets.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}

/// 選擇並刪除預設集，刪除前需確認
fn remove_preset_interactive(term: &Term, presets: &[String]) -> Result<()> {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("presets.remove_prompt"))
        .items(presets)
        .default(0)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };
    let name = &presets[selection];

    let confirmed = Confirm::new()
        .with_prompt(format!("{} {name}?", t!("presets.confirm_remove")))
        .default(false)
        .interact()?;

    if confirmed {
        remove_preset(name)?;
        println!("\n{} {name}", style(t!("presets.removed")).green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];
    let items: Vec<String> = languages.iter().map(|l: &Language| l.to_string()).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), selected_lang);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 遮蔽 API 金鑰，只顯示末四碼
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        "-".to_string()
    } else if key.len() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", &key[key.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "-");
        assert_eq!(mask_key("ab"), "****");
        assert_eq!(mask_key("abcdefgh"), "****efgh");
    }
}
