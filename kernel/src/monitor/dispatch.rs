// kernel/src/monitor/dispatch.rs
//
// 役割:
// - 1 行を空白で区切り（tokenize）、コマンド表（Registry）を先頭から引いて実行する。
// - ハンドラのエラーは 1 行で表示してループに戻す。
//
// 不変条件:
// - コマンド表は 'static な読み取り専用スライス。名前の重複は無い。

use core::fmt::Write;

use crate::arch::trapframe::Trapframe;

use super::error::{MonitorError, Result};
use super::{backtrace, content, exec, info, mappings, Flow, MonitorCtx};

/// 区切り文字
pub const WHITESPACE: &[char] = &['\t', '\r', '\n', ' '];

/// argv の大きさ。最後の 1 つは終端用に空けておくので、トークンは MAXARGS - 1 個まで。
pub const MAXARGS: usize = 16;

pub type Handler =
    fn(&mut MonitorCtx<'_>, &[&str], Option<&mut Trapframe>) -> Result<Flow>;

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub desc: &'static str,
    pub func: Handler,
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

pub static BUILTIN_COMMANDS: [Command; 8] = [
    Command {
        name: "help",
        desc: "Display this list of commands",
        func: info::mon_help,
    },
    Command {
        name: "kerninfo",
        desc: "Display information about the kernel",
        func: info::mon_kerninfo,
    },
    Command {
        name: "backtrace",
        desc: "Display information about the stack",
        func: backtrace::mon_backtrace,
    },
    Command {
        name: "showmappings",
        desc: "Display physical page mappings that apply to addresses requested",
        func: mappings::mon_showmappings,
    },
    Command {
        name: "modifyperm",
        desc: "Set, clear, or change the permissions of any mapping in the current address space",
        func: mappings::mon_modifyperm,
    },
    Command {
        name: "content",
        desc: "Dump the contents of a range of memory given either a virtual or physical address",
        func: content::mon_content,
    },
    Command {
        name: "c",
        desc: "continue",
        func: exec::mon_continue,
    },
    Command {
        name: "si",
        desc: "step",
        func: exec::mon_step,
    },
];

/// 登録順に引くコマンド表
pub struct Registry<'r> {
    commands: &'r [Command],
}

impl Registry<'static> {
    pub fn builtin() -> Self {
        Registry {
            commands: &BUILTIN_COMMANDS,
        }
    }
}

impl<'r> Registry<'r> {
    pub fn new(commands: &'r [Command]) -> Self {
        Registry { commands }
    }

    pub fn commands(&self) -> &'r [Command] {
        self.commands
    }

    pub fn find(&self, name: &str) -> Option<&'r Command> {
        self.commands.iter().find(|c| c.name == name)
    }
}

/// 空白で区切る。トークン数が MAXARGS - 1 を超えたら失敗。
pub fn tokenize<'l>(line: &'l str, argv: &mut [&'l str; MAXARGS]) -> Result<usize> {
    let mut argc = 0;
    for word in line.split(WHITESPACE).filter(|w| !w.is_empty()) {
        if argc == MAXARGS - 1 {
            return Err(MonitorError::TooManyArguments { max: MAXARGS });
        }
        argv[argc] = word;
        argc += 1;
    }
    Ok(argc)
}

/// 1 行を実行する。エラーも未知コマンドもここで表示して Continue にする。
pub fn runcmd(ctx: &mut MonitorCtx<'_>, line: &str, tf: Option<&mut Trapframe>) -> Flow {
    let mut argv = [""; MAXARGS];
    let result = tokenize(line, &mut argv).and_then(|argc| {
        let argv = &argv[..argc];
        let Some(name) = argv.first() else {
            return Ok(Flow::Continue);
        };
        match ctx.registry.find(name) {
            Some(cmd) => (cmd.func)(ctx, argv, tf),
            None => {
                writeln!(ctx.console, "Unknown command '{}'", name)?;
                Ok(Flow::Continue)
            }
        }
    });

    match result {
        Ok(flow) => flow,
        Err(MonitorError::Console(_)) => {
            log::warn!("monitor: console write failed");
            Flow::Continue
        }
        Err(e) => {
            if writeln!(ctx.console, "{}", e).is_err() {
                log::warn!("monitor: console write failed");
            }
            Flow::Continue
        }
    }
}
