//! 対話的なプロンプト
//!
//! このモジュールは、候補グループを端末に表示し、標準入力から
//! オペレーターの判断を読み取ります。エンジン側は判断関数しか見ない
//! ため、ここを差し替えればヘッドレス実行やUIの置き換えができます。

use std::io::{self, BufRead, Write};

use palilex::reconcile::{Decision, GroupView, RunSummary};

/// 判断の選択肢
const QUESTION: &str = "(s)ynonym (v)ariant (m)anual (e)xception (p)ass (b)reak: ";

/// グループを表示し、オペレーターの判断を読み取ります。
///
/// 不正な入力は再入力を求めます。標準入力が閉じられた場合（EOF）と
/// 読み取りエラーは中断として扱います。
///
/// # 引数
///
/// * `view` - レンダリングされたグループ
///
/// # 戻り値
///
/// オペレーターの判断
pub fn ask(view: &GroupView) -> Decision {
    print_group(view);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{QUESTION}");
        if io::stdout().flush().is_err() {
            return Decision::Abort;
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return Decision::Abort,
            Ok(_) => {}
        }
        match line.trim().parse() {
            Ok(decision) => return decision,
            Err(_) => println!("Could not parse the choice."),
        }
    }
}

/// グループの内容を表示する
fn print_group(view: &GroupView) {
    println!("\n{}", view.key);
    for member in &view.members {
        println!(
            "{:<20} {:<10} {:<40} [{}] [{}]",
            member.lemma,
            member.pos,
            member.meaning,
            member.synonyms.join(", "),
            member.variants.join(", "),
        );
    }
    println!("synonyms:   {}", view.synonyms.join(", "));
    println!("variants:   {}", view.variants.join(", "));
    println!("candidates: {}", view.clean_lemmas.join(", "));
    // for pasting into an external search tool
    println!("search:     {}", view.search_string);
}

/// 実行の集計を表示します。
pub fn print_summary(summary: &RunSummary) {
    println!("\npresented:         {}", summary.presented);
    println!("synonyms applied:  {}", summary.synonyms_applied);
    println!("variants applied:  {}", summary.variants_applied);
    println!("manual edits:      {}", summary.manual_noted);
    println!("excepted:          {}", summary.excepted);
    println!("passed:            {}", summary.passed);
    println!("already satisfied: {}", summary.already_satisfied);
    println!("excepted earlier:  {}", summary.excluded);
    if summary.failed_groups > 0 {
        println!("failed commits:    {}", summary.failed_groups);
    }
    if summary.aborted {
        println!("run aborted by operator");
    }
}
