// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::stackblur::accumulator::PortableLanes;
#[cfg(all(target_arch = "aarch64", feature = "neon"))]
use crate::stackblur::neon::blur_lines_neon;
use crate::stackblur::sliding_window::SlidingWindow;
#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
use crate::stackblur::sse::{blur_lines_sse2, blur_lines_sse41};
use crate::stackblur::stack_blur_pass::{blur_lines, LinesProcessor};
use std::fmt::{Display, Formatter};

/// Implementation tier of the stack blur line kernel.
///
/// All tiers produce byte-identical output, they differ only in speed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackBlurKernel {
    /// Per-channel `i32` sums with true integer division
    Reference,
    /// Plain `u32` lanes with the multiply-shift division
    Portable,
    /// x86 baseline SSE2
    Sse2,
    /// x86 SSE4.1
    Sse41,
    /// aarch64 NEON
    Neon,
}

/// How the sliding window is primed at the start of each line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WindowFill {
    /// One clamped read per window slot
    Sequential,
    /// Left edge as a single weighted sum and the right edge pixel loaded once.
    /// Lines not longer than the radius use [WindowFill::Sequential].
    ClosedForm,
}

impl StackBlurKernel {
    pub const ALL: [StackBlurKernel; 5] = [
        StackBlurKernel::Reference,
        StackBlurKernel::Portable,
        StackBlurKernel::Sse2,
        StackBlurKernel::Sse41,
        StackBlurKernel::Neon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StackBlurKernel::Reference => "reference",
            StackBlurKernel::Portable => "portable",
            StackBlurKernel::Sse2 => "sse2",
            StackBlurKernel::Sse41 => "sse4.1",
            StackBlurKernel::Neon => "neon",
        }
    }

    /// Whether this build and the running CPU can execute the tier
    pub fn is_supported(&self) -> bool {
        match self {
            StackBlurKernel::Reference | StackBlurKernel::Portable => true,
            StackBlurKernel::Sse2 => has_sse2(),
            StackBlurKernel::Sse41 => has_sse41(),
            StackBlurKernel::Neon => has_neon(),
        }
    }

    /// Fastest tier available on this machine
    pub fn detect() -> StackBlurKernel {
        [
            StackBlurKernel::Sse41,
            StackBlurKernel::Sse2,
            StackBlurKernel::Neon,
        ]
        .into_iter()
        .find(|kernel| kernel.is_supported())
        .unwrap_or(StackBlurKernel::Portable)
    }

    pub fn supported() -> Vec<StackBlurKernel> {
        Self::ALL
            .into_iter()
            .filter(|kernel| kernel.is_supported())
            .collect()
    }

    /// Fill used when none is requested explicitly.
    pub fn default_fill(&self) -> WindowFill {
        match self {
            StackBlurKernel::Reference => WindowFill::Sequential,
            _ => WindowFill::ClosedForm,
        }
    }

    /// Line processor for this tier, `None` when it is not compiled in
    /// or the CPU lacks it.
    pub(crate) fn processor(&self, fill: WindowFill) -> Option<LinesProcessor> {
        if !self.is_supported() {
            return None;
        }
        let closed_form = fill == WindowFill::ClosedForm;
        let processor: LinesProcessor = match (*self, closed_form) {
            (StackBlurKernel::Reference, false) => blur_lines::<SlidingWindow, false>,
            (StackBlurKernel::Reference, true) => blur_lines::<SlidingWindow, true>,
            (StackBlurKernel::Portable, false) => blur_lines::<PortableLanes, false>,
            (StackBlurKernel::Portable, true) => blur_lines::<PortableLanes, true>,
            #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
            (StackBlurKernel::Sse2, false) => blur_lines_sse2::<false>,
            #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
            (StackBlurKernel::Sse2, true) => blur_lines_sse2::<true>,
            #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
            (StackBlurKernel::Sse41, false) => blur_lines_sse41::<false>,
            #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
            (StackBlurKernel::Sse41, true) => blur_lines_sse41::<true>,
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            (StackBlurKernel::Neon, false) => blur_lines_neon::<false>,
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            (StackBlurKernel::Neon, true) => blur_lines_neon::<true>,
            #[allow(unreachable_patterns)]
            _ => return None,
        };
        Some(processor)
    }
}

impl Display for StackBlurKernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
fn has_sse2() -> bool {
    std::arch::is_x86_feature_detected!("sse2")
}

#[cfg(not(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse")))]
fn has_sse2() -> bool {
    false
}

#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
fn has_sse41() -> bool {
    std::arch::is_x86_feature_detected!("sse4.1")
}

#[cfg(not(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse")))]
fn has_sse41() -> bool {
    false
}

#[cfg(all(target_arch = "aarch64", feature = "neon"))]
fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(all(target_arch = "aarch64", feature = "neon")))]
fn has_neon() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_supported() {
        let kernel = StackBlurKernel::detect();
        assert!(kernel.is_supported());
        assert_ne!(kernel, StackBlurKernel::Reference);
        #[cfg(all(target_arch = "x86_64", feature = "sse"))]
        assert!(matches!(
            kernel,
            StackBlurKernel::Sse2 | StackBlurKernel::Sse41
        ));
    }

    #[test]
    fn test_supported_always_has_portable_tiers() {
        let supported = StackBlurKernel::supported();
        assert!(supported.contains(&StackBlurKernel::Reference));
        assert!(supported.contains(&StackBlurKernel::Portable));
        assert!(supported.contains(&StackBlurKernel::detect()));
    }

    #[test]
    fn test_processor_matches_support() {
        for kernel in StackBlurKernel::ALL {
            for fill in [WindowFill::Sequential, WindowFill::ClosedForm] {
                assert_eq!(kernel.processor(fill).is_some(), kernel.is_supported());
            }
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(StackBlurKernel::Sse41.to_string(), "sse4.1");
        assert_eq!(StackBlurKernel::Reference.default_fill(), WindowFill::Sequential);
        assert_eq!(StackBlurKernel::Neon.default_fill(), WindowFill::ClosedForm);
    }
}
