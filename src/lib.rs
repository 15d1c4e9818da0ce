//! # rnastructure-rs
//!
//! [RNAstructure](https://rna.urmc.rochester.edu/RNAstructure.html) 外部程序的 Rust 薄封装层。
//!
//! 本 crate 自身不做任何热力学计算：折叠算法、配分函数等全部由外部的
//! RNAstructure 可执行程序完成。crate 负责的是其余的"管道"工作：
//!
//! - **输入构建**：把 FASTA 记录或字符串序列写成外部工具的输入文件
//! - **子进程调用**：依次调用 `Fold` / `partition` / `ProbabilityPlot`
//! - **输出解析**：解析连接表（CT）与配对概率文本，转成点括号记法与概率向量/矩阵
//! - **后处理**：可选地向配对概率信号注入二项分布测序噪声 B(3000, p)
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use rnastructure_rs::predict::{predict_from_sequence, PredictOpt};
//!
//! let opt = PredictOpt::default();
//! let pred = predict_from_sequence("GGGAAACCC", &opt).unwrap();
//! println!("{}", pred.structure.unwrap()); // e.g. "(((...)))"
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTA / 连接表（CT）/ 概率图文本解析
//! - [`predict`] — 高层预测 API、RNAstructure 子进程驱动、噪声注入
//! - [`util`] — 序列归一化与非配对约束标注

pub mod io;
pub mod predict;
pub mod util;
