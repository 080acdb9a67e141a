// kernel/src/monitor/exec.rs
//
// c / si: トラップ元の再開。
// - EFLAGS.TF を落とす / 立てるだけで、実際に戻るのは呼び出し側（Flow::Resume を受けたトラップ経路）。

use crate::arch::trapframe::Trapframe;

use super::error::{MonitorError, Result};
use super::{Flow, MonitorCtx};

fn resume(argv: &[&str], tf: Option<&mut Trapframe>, what: &'static str, single_step: bool) -> Result<Flow> {
    if argv.len() != 1 {
        return Err(MonitorError::InvalidParameterCount);
    }
    let tf = tf.ok_or(MonitorError::NoTrapContext(what))?;
    tf.set_single_step(single_step);
    log::debug!("monitor: {} from eip={:#x}", what, tf.eip);
    Ok(Flow::Resume)
}

pub fn mon_continue(_ctx: &mut MonitorCtx<'_>, argv: &[&str], tf: Option<&mut Trapframe>) -> Result<Flow> {
    resume(argv, tf, "continue", false)
}

pub fn mon_step(_ctx: &mut MonitorCtx<'_>, argv: &[&str], tf: Option<&mut Trapframe>) -> Result<Flow> {
    resume(argv, tf, "step", true)
}
