use std::io::Write;

/// Line-rewriting `desc: i/n` counter on stderr. Disabled instances print nothing.
pub struct Progress {
    desc: String,
    total: usize,
    done: usize,
    enabled: bool,
}

impl Progress {
    pub fn new(desc: impl Into<String>, total: usize, enabled: bool) -> Self {
        let progress = Self {
            desc: desc.into(),
            total,
            done: 0,
            enabled: enabled && total > 0,
        };
        progress.draw();
        progress
    }

    pub fn tick(&mut self) {
        self.done = (self.done + 1).min(self.total);
        self.draw();
        if self.done == self.total && self.enabled {
            eprintln!();
        }
    }

    fn draw(&self) {
        if !self.enabled {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}: {}/{}", self.desc, self.done, self.total);
        let _ = stderr.flush();
    }

    #[cfg(test)]
    pub fn done(&self) -> usize {
        self.done
    }
}
